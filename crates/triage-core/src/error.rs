use crate::types::{Role, Stage};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TriageError {
    #[error("not initialized: run 'triage init'")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("no user configured: run 'triage user set --name <name> --role <role>'")]
    NoUser,

    #[error("ticket not found: {0}")]
    TicketNotFound(String),

    #[error("ticket already exists: {0}")]
    TicketExists(String),

    #[error("sprint not found: {0}")]
    SprintNotFound(String),

    #[error("sprint already exists: {0}")]
    SprintExists(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("invalid id '{0}': must be uppercase alphanumeric with hyphens")]
    InvalidId(String),

    #[error("stage '{stage}' is read-only for role {role}")]
    ReadOnly { role: Role, stage: Stage },

    #[error("sprints must start on a Monday (got {0})")]
    NotMonday(NaiveDate),

    #[error("capacity must be a positive number of man-days")]
    InvalidCapacity,

    #[error("task dates must fall within the sprint window {start} to {end}")]
    OutsideSprintWindow { start: NaiveDate, end: NaiveDate },

    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("invalid {what}: '{value}'")]
    InvalidValue { what: &'static str, value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TriageError>;
