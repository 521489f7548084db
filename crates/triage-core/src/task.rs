use crate::error::{Result, TriageError};
use crate::paths;
use crate::sprint::Sprint;
use crate::ticket::Ticket;
use crate::types::TaskStatus;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

pub const UNASSIGNED: &str = "Unassigned";

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// A unit of sprint work. `ticket_id` is a weak back-reference: the ticket
/// does not know about its tasks, and deleting a task never touches a ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub sprint_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
    pub title: String,
    pub assignee: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub effort: u32,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new_id() -> String {
        let hex = Uuid::new_v4().simple().to_string();
        format!("TASK-{}", &hex[..8])
    }

    /// Manually schedule work into a sprint. Both dates must fall inside the
    /// sprint window and be ordered; effort is the inclusive day span.
    pub fn schedule(
        sprint: &Sprint,
        title: impl Into<String>,
        ticket_id: Option<String>,
        assignee: Option<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self> {
        if !sprint.contains(start) || !sprint.contains(end) {
            return Err(TriageError::OutsideSprintWindow {
                start: sprint.start_date,
                end: sprint.end_date,
            });
        }
        if end < start {
            return Err(TriageError::EndBeforeStart { start, end });
        }
        let effort = ((end - start).num_days() + 1).max(0) as u32;
        let now = Utc::now();
        Ok(Self {
            id: Self::new_id(),
            sprint_id: sprint.id.clone(),
            ticket_id,
            title: title.into(),
            assignee: assignee.unwrap_or_else(|| UNASSIGNED.to_string()),
            start_date: start,
            end_date: end,
            effort,
            status: TaskStatus::ToDo,
            created_at: now,
            updated_at: now,
        })
    }

    /// Free-form edit. Dates and effort are taken as given with no window
    /// re-check; a task can be edited out of its sprint window.
    pub fn edit(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(assignee) = patch.assignee {
            self.assignee = assignee;
        }
        if let Some(start) = patch.start_date {
            self.start_date = start;
        }
        if let Some(end) = patch.end_date {
            self.end_date = end;
        }
        if let Some(effort) = patch.effort {
            self.effort = effort;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn load(root: &Path, id: &str) -> Result<Self> {
        let path = paths::task_path(root, id);
        if !path.exists() {
            return Err(TriageError::TaskNotFound(id.to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        let task: Task = serde_yaml::from_str(&data)?;
        Ok(task)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::task_path(root, &self.id);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn delete(&self, root: &Path) -> Result<()> {
        let path = paths::task_path(root, &self.id);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// All tasks, oldest first (creation order).
    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let dir = root.join(paths::TASKS_DIR);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut tasks = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "yaml") {
                let data = std::fs::read_to_string(&path)?;
                let task: Task = serde_yaml::from_str(&data)?;
                tasks.push(task);
            }
        }
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(tasks)
    }
}

/// Tasks belonging to one sprint, in creation order.
pub fn tasks_for_sprint<'a>(tasks: &'a [Task], sprint_id: &str) -> Vec<&'a Task> {
    tasks.iter().filter(|t| t.sprint_id == sprint_id).collect()
}

/// Approved tickets that no task references yet.
pub fn backlog<'a>(tickets: &'a [Ticket], tasks: &[Task]) -> Vec<&'a Ticket> {
    tickets
        .iter()
        .filter(|t| t.pm_status == crate::types::PmStatus::Approved)
        .filter(|t| !tasks.iter().any(|task| task.ticket_id.as_deref() == Some(t.id.as_str())))
        .collect()
}

// ---------------------------------------------------------------------------
// TaskPatch
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub assignee: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub effort: Option<u32>,
    pub status: Option<TaskStatus>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
