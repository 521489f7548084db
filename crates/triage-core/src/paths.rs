use crate::error::{Result, TriageError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const TRIAGE_DIR: &str = ".triage";
pub const TICKETS_DIR: &str = ".triage/tickets";
pub const SPRINTS_DIR: &str = ".triage/sprints";
pub const TASKS_DIR: &str = ".triage/tasks";

pub const CONFIG_FILE: &str = ".triage/config.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn triage_dir(root: &Path) -> PathBuf {
    root.join(TRIAGE_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn ticket_path(root: &Path, id: &str) -> PathBuf {
    root.join(TICKETS_DIR).join(format!("{id}.yaml"))
}

pub fn sprint_path(root: &Path, id: &str) -> PathBuf {
    root.join(SPRINTS_DIR).join(format!("{id}.yaml"))
}

pub fn task_path(root: &Path, id: &str) -> PathBuf {
    root.join(TASKS_DIR).join(format!("{id}.yaml"))
}

// ---------------------------------------------------------------------------
// Id validation
// ---------------------------------------------------------------------------

static ID_RE: OnceLock<Regex> = OnceLock::new();

fn id_re() -> &'static Regex {
    // Uppercase alphanumeric with interior hyphens: REQ-001, SPRINT-24, TASK-9F2A.
    ID_RE.get_or_init(|| Regex::new(r"^[A-Z0-9][A-Za-z0-9\-]*[A-Za-z0-9]$").unwrap())
}

pub fn validate_id(id: &str) -> Result<()> {
    if id.len() < 2 || id.len() > 64 || !id_re().is_match(id) {
        return Err(TriageError::InvalidId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ids() {
        for id in ["REQ-001", "SPRINT-24", "TASK-9f2a44b1", "X1"] {
            validate_id(id).unwrap_or_else(|_| panic!("expected valid: {id}"));
        }
    }

    #[test]
    fn invalid_ids() {
        for id in ["", "R", "-REQ", "REQ-", "has space", "req/../001"] {
            assert!(validate_id(id).is_err(), "expected invalid: {id}");
        }
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/proj/.triage/config.yaml")
        );
        assert_eq!(
            ticket_path(root, "REQ-001"),
            PathBuf::from("/tmp/proj/.triage/tickets/REQ-001.yaml")
        );
        assert_eq!(
            sprint_path(root, "SPRINT-1"),
            PathBuf::from("/tmp/proj/.triage/sprints/SPRINT-1.yaml")
        );
    }
}
