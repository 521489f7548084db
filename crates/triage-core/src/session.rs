use crate::access::can_edit;
use crate::config::Config;
use crate::error::{Result, TriageError};
use crate::io;
use crate::paths;
use crate::promotion::promote;
use crate::sprint::{Sprint, SprintPatch};
use crate::task::{self, Task, TaskPatch};
use crate::ticket::{Ticket, TicketField};
use crate::types::{Role, Stage};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A loaded project: config plus all records, with every mutation going
/// through the store first. In-memory state only reflects successful writes,
/// so a failed save leaves the session consistent with disk.
#[derive(Debug)]
pub struct Session {
    root: PathBuf,
    pub config: Config,
    pub tickets: Vec<Ticket>,
    pub sprints: Vec<Sprint>,
    pub tasks: Vec<Task>,
}

impl Session {
    /// Create the `.triage` layout and config. Errors if already initialized.
    pub fn init(root: &Path, project: impl Into<String>) -> Result<Config> {
        if paths::config_path(root).exists() {
            return Err(TriageError::AlreadyInitialized(
                paths::triage_dir(root).display().to_string(),
            ));
        }
        io::ensure_dir(&root.join(paths::TICKETS_DIR))?;
        io::ensure_dir(&root.join(paths::SPRINTS_DIR))?;
        io::ensure_dir(&root.join(paths::TASKS_DIR))?;

        let config = Config::new(project);
        config.save(root)?;
        info!(root = %root.display(), "initialized project '{}'", config.project);
        Ok(config)
    }

    pub fn load(root: &Path) -> Result<Self> {
        let config = Config::load(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
            tickets: Ticket::list(root)?,
            sprints: Sprint::list(root)?,
            tasks: Task::list(root)?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn acting_role(&self) -> Result<Role> {
        Ok(self.config.require_user()?.role)
    }

    // ---------------------------------------------------------------------------
    // Tickets
    // ---------------------------------------------------------------------------

    /// Create a ticket with an auto-assigned sequential id. BD only.
    pub fn create_ticket(&mut self, fields: Vec<TicketField>) -> Result<Ticket> {
        let role = self.acting_role()?;
        if role != Role::Bd {
            return Err(TriageError::ReadOnly {
                role,
                stage: Stage::Requirement,
            });
        }
        for field in &fields {
            if !can_edit(role, field.stage()) {
                return Err(TriageError::ReadOnly {
                    role,
                    stage: field.stage(),
                });
            }
        }

        let id = Ticket::next_id(self.tickets.len());
        let mut ticket = Ticket::new(id);
        for field in fields {
            ticket.apply(field);
        }
        ticket.save(&self.root)?;
        info!(ticket = %ticket.id, "ticket created");
        // Newest first.
        self.tickets.insert(0, ticket.clone());
        Ok(ticket)
    }

    /// Apply field updates to a ticket. Every field must belong to the acting
    /// role's stage; rejection happens before any mutation. A successful save
    /// then runs the task promotion rule.
    pub fn update_ticket(
        &mut self,
        id: &str,
        fields: Vec<TicketField>,
    ) -> Result<(Ticket, Option<Task>)> {
        let role = self.acting_role()?;
        for field in &fields {
            if !can_edit(role, field.stage()) {
                return Err(TriageError::ReadOnly {
                    role,
                    stage: field.stage(),
                });
            }
        }

        let pos = self
            .tickets
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TriageError::TicketNotFound(id.to_string()))?;

        let mut ticket = self.tickets[pos].clone();
        for field in fields {
            ticket.apply(field);
        }
        ticket.save(&self.root)?;
        self.tickets[pos] = ticket.clone();

        let promoted = promote(&ticket, &self.sprints, &self.tasks, self.config.promotion)?;
        if let Some(task) = &promoted {
            task.save(&self.root)?;
            self.tasks.push(task.clone());
        }
        Ok((ticket, promoted))
    }

    pub fn ticket(&self, id: &str) -> Result<&Ticket> {
        self.tickets
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| TriageError::TicketNotFound(id.to_string()))
    }

    /// Tickets matching a case-insensitive search term (id, title, source).
    pub fn search_tickets(&self, term: &str) -> Vec<&Ticket> {
        self.tickets.iter().filter(|t| t.matches(term)).collect()
    }

    // ---------------------------------------------------------------------------
    // Sprints
    // ---------------------------------------------------------------------------

    /// Create a sprint with an auto-assigned id. PM only.
    pub fn create_sprint(
        &mut self,
        name: Option<String>,
        goal: String,
        start: NaiveDate,
        capacity: u32,
    ) -> Result<Sprint> {
        self.require_pm()?;

        let id = Sprint::next_id(self.sprints.len());
        if paths::sprint_path(&self.root, &id).exists() {
            return Err(TriageError::SprintExists(id));
        }
        let name = name.unwrap_or_else(|| Sprint::default_name(self.sprints.len()));
        let sprint = Sprint::new(id, name, goal, start, capacity)?;
        sprint.save(&self.root)?;
        info!(sprint = %sprint.id, start = %sprint.start_date, "sprint created");
        self.sprints.push(sprint.clone());
        self.sprints.sort_by_key(|s| s.start_date);
        Ok(sprint)
    }

    pub fn edit_sprint(&mut self, id: &str, patch: SprintPatch) -> Result<Sprint> {
        self.require_pm()?;

        let pos = self
            .sprints
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| TriageError::SprintNotFound(id.to_string()))?;

        let mut sprint = self.sprints[pos].clone();
        sprint.edit(patch)?;
        sprint.save(&self.root)?;
        self.sprints[pos] = sprint.clone();
        self.sprints.sort_by_key(|s| s.start_date);
        Ok(sprint)
    }

    /// Delete a sprint and every task scheduled in it.
    pub fn delete_sprint(&mut self, id: &str) -> Result<usize> {
        self.require_pm()?;

        let pos = self
            .sprints
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| TriageError::SprintNotFound(id.to_string()))?;

        let doomed: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| t.sprint_id == id)
            .cloned()
            .collect();
        for task in &doomed {
            task.delete(&self.root)?;
        }
        self.tasks.retain(|t| t.sprint_id != id);

        let sprint = self.sprints.remove(pos);
        sprint.delete(&self.root)?;
        info!(sprint = %id, cascaded = doomed.len(), "sprint deleted");
        Ok(doomed.len())
    }

    pub fn sprint(&self, id: &str) -> Result<&Sprint> {
        self.sprints
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| TriageError::SprintNotFound(id.to_string()))
    }

    /// Committed effort and utilization percentage for one sprint.
    pub fn sprint_load(&self, id: &str) -> Result<(u32, u32)> {
        let sprint = self.sprint(id)?;
        let effort: u32 = task::tasks_for_sprint(&self.tasks, id)
            .iter()
            .map(|t| t.effort)
            .sum();
        Ok((effort, sprint.utilization(effort)))
    }

    fn require_pm(&self) -> Result<()> {
        let role = self.acting_role()?;
        if role != Role::Pm {
            return Err(TriageError::ReadOnly {
                role,
                stage: Stage::Approval,
            });
        }
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // Tasks
    // ---------------------------------------------------------------------------

    /// Schedule a task into a sprint, either from a backlog ticket (title
    /// copied from the ticket) or with an explicit title.
    pub fn add_task(
        &mut self,
        sprint_id: &str,
        ticket_id: Option<String>,
        title: Option<String>,
        assignee: Option<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Task> {
        let sprint = self.sprint(sprint_id)?.clone();
        let title = match (&ticket_id, title) {
            (Some(id), None) => self.ticket(id)?.title.clone(),
            (_, Some(title)) => title,
            (None, None) => {
                return Err(TriageError::InvalidValue {
                    what: "task",
                    value: "either a ticket id or a title is required".to_string(),
                })
            }
        };

        let task = Task::schedule(&sprint, title, ticket_id, assignee, start, end)?;
        task.save(&self.root)?;
        self.tasks.push(task.clone());
        Ok(task)
    }

    pub fn edit_task(&mut self, id: &str, patch: TaskPatch) -> Result<Task> {
        let pos = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TriageError::TaskNotFound(id.to_string()))?;

        let mut task = self.tasks[pos].clone();
        task.edit(patch);
        task.save(&self.root)?;
        self.tasks[pos] = task.clone();
        Ok(task)
    }

    pub fn delete_task(&mut self, id: &str) -> Result<()> {
        let pos = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TriageError::TaskNotFound(id.to_string()))?;
        let task = self.tasks.remove(pos);
        task.delete(&self.root)
    }

    pub fn tasks_for_sprint(&self, sprint_id: &str) -> Vec<&Task> {
        task::tasks_for_sprint(&self.tasks, sprint_id)
    }

    /// Approved tickets with no task referencing them.
    pub fn backlog(&self) -> Vec<&Ticket> {
        task::backlog(&self.tickets, &self.tasks)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BaStatus, PmStatus, TShirtSize};
    use tempfile::TempDir;

    fn session(role: Role) -> (TempDir, Session) {
        let dir = TempDir::new().unwrap();
        Session::init(dir.path(), "paathner").unwrap();
        let mut session = Session::load(dir.path()).unwrap();
        session.config.set_user("test", role);
        session.config.save(dir.path()).unwrap();
        (dir, session)
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 14).unwrap()
    }

    #[test]
    fn init_twice_fails() {
        let dir = TempDir::new().unwrap();
        Session::init(dir.path(), "p").unwrap();
        assert!(matches!(
            Session::init(dir.path(), "p"),
            Err(TriageError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn load_without_init_fails() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Session::load(dir.path()),
            Err(TriageError::NotInitialized)
        ));
    }

    #[test]
    fn bd_creates_tickets_with_sequential_ids() {
        let (_dir, mut session) = session(Role::Bd);
        let first = session
            .create_ticket(vec![TicketField::Title("A".into())])
            .unwrap();
        let second = session
            .create_ticket(vec![TicketField::Title("B".into())])
            .unwrap();
        assert_eq!(first.id, "REQ-001");
        assert_eq!(second.id, "REQ-002");
        // Newest first.
        assert_eq!(session.tickets[0].id, "REQ-002");
    }

    #[test]
    fn non_bd_cannot_create_tickets() {
        let (_dir, mut session) = session(Role::Dev);
        let err = session.create_ticket(vec![]).unwrap_err();
        assert!(matches!(
            err,
            TriageError::ReadOnly {
                role: Role::Dev,
                stage: Stage::Requirement
            }
        ));
    }

    #[test]
    fn update_rejects_foreign_stage_before_mutation() {
        let (dir, mut session) = session(Role::Bd);
        session
            .create_ticket(vec![TicketField::Title("A".into())])
            .unwrap();

        // BD touching a BA field: rejected, nothing written.
        let err = session
            .update_ticket(
                "REQ-001",
                vec![
                    TicketField::Title("B".into()),
                    TicketField::BaStatus(BaStatus::AnalysisComplete),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, TriageError::ReadOnly { .. }));

        let on_disk = Ticket::load(dir.path(), "REQ-001").unwrap();
        assert_eq!(on_disk.title, "A");
        assert_eq!(on_disk.ba_status, BaStatus::Pending);
    }

    #[test]
    fn no_user_is_rejected() {
        let dir = TempDir::new().unwrap();
        Session::init(dir.path(), "p").unwrap();
        let mut session = Session::load(dir.path()).unwrap();
        assert!(matches!(
            session.create_ticket(vec![]),
            Err(TriageError::NoUser)
        ));
    }

    #[test]
    fn pm_gate_on_sprint_ops() {
        let (_dir, mut session) = session(Role::Ba);
        let err = session
            .create_sprint(None, "goal".into(), monday(), 20)
            .unwrap_err();
        assert!(matches!(
            err,
            TriageError::ReadOnly {
                role: Role::Ba,
                stage: Stage::Approval
            }
        ));
    }

    #[test]
    fn sprint_gets_default_name() {
        let (_dir, mut session) = session(Role::Pm);
        let sprint = session
            .create_sprint(None, "Checkout".into(), monday(), 20)
            .unwrap();
        assert_eq!(sprint.id, "SPRINT-1");
        assert_eq!(sprint.name, "Sprint 1");
    }

    #[test]
    fn approval_then_sprint_assignment_promotes_once() {
        let (_dir, mut session) = session(Role::Pm);
        session.config.set_user("bd", Role::Bd);
        session
            .create_ticket(vec![TicketField::Title("Checkout".into())])
            .unwrap();

        session.config.set_user("pm", Role::Pm);
        session
            .create_sprint(None, "goal".into(), monday(), 20)
            .unwrap();

        let (_, task) = session
            .update_ticket(
                "REQ-001",
                vec![
                    TicketField::PmStatus(PmStatus::Approved),
                    TicketField::Effort(Some(TShirtSize::M)),
                    TicketField::SprintCycle(Some("SPRINT-1".into())),
                ],
            )
            .unwrap();
        let task = task.unwrap();
        assert_eq!(task.title, "Checkout");
        assert_eq!(task.effort, 3);
        assert_eq!(
            task.end_date,
            NaiveDate::from_ymd_opt(2024, 10, 17).unwrap()
        );

        // Re-saving the ticket does not duplicate the task.
        let (_, again) = session
            .update_ticket("REQ-001", vec![TicketField::RiskLevel(None)])
            .unwrap();
        assert!(again.is_none());
        assert_eq!(session.tasks.len(), 1);
    }

    #[test]
    fn backlog_shrinks_as_tasks_reference_tickets() {
        let (_dir, mut session) = session(Role::Bd);
        session
            .create_ticket(vec![TicketField::Title("A".into())])
            .unwrap();

        session.config.set_user("pm", Role::Pm);
        session
            .create_sprint(None, "goal".into(), monday(), 20)
            .unwrap();
        // Approve without assigning a sprint: lands in backlog.
        session
            .update_ticket("REQ-001", vec![TicketField::PmStatus(PmStatus::Approved)])
            .unwrap();
        assert_eq!(session.backlog().len(), 1);

        session
            .add_task(
                "SPRINT-1",
                Some("REQ-001".into()),
                None,
                None,
                monday(),
                NaiveDate::from_ymd_opt(2024, 10, 16).unwrap(),
            )
            .unwrap();
        assert!(session.backlog().is_empty());
    }

    #[test]
    fn task_title_copied_from_ticket() {
        let (_dir, mut session) = session(Role::Bd);
        session
            .create_ticket(vec![TicketField::Title("Checkout".into())])
            .unwrap();
        session.config.set_user("pm", Role::Pm);
        session
            .create_sprint(None, "goal".into(), monday(), 20)
            .unwrap();

        let task = session
            .add_task(
                "SPRINT-1",
                Some("REQ-001".into()),
                None,
                None,
                monday(),
                monday(),
            )
            .unwrap();
        assert_eq!(task.title, "Checkout");
        assert_eq!(task.effort, 1);
    }

    #[test]
    fn delete_sprint_cascades_to_tasks() {
        let (dir, mut session) = session(Role::Pm);
        session
            .create_sprint(None, "goal".into(), monday(), 20)
            .unwrap();
        session
            .add_task("SPRINT-1", None, Some("a".into()), None, monday(), monday())
            .unwrap();
        session
            .add_task("SPRINT-1", None, Some("b".into()), None, monday(), monday())
            .unwrap();

        let removed = session.delete_sprint("SPRINT-1").unwrap();
        assert_eq!(removed, 2);
        assert!(session.tasks.is_empty());
        assert!(Task::list(dir.path()).unwrap().is_empty());
        assert!(Sprint::list(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn sprint_load_sums_effort() {
        let (_dir, mut session) = session(Role::Pm);
        session
            .create_sprint(None, "goal".into(), monday(), 10)
            .unwrap();
        session
            .add_task(
                "SPRINT-1",
                None,
                Some("a".into()),
                None,
                monday(),
                NaiveDate::from_ymd_opt(2024, 10, 18).unwrap(),
            )
            .unwrap();

        let (effort, pct) = session.sprint_load("SPRINT-1").unwrap();
        assert_eq!(effort, 5);
        assert_eq!(pct, 50);
    }

    #[test]
    fn search_filters_tickets() {
        let (_dir, mut session) = session(Role::Bd);
        session
            .create_ticket(vec![TicketField::Title("Checkout flow".into())])
            .unwrap();
        session
            .create_ticket(vec![TicketField::Title("Push notifications".into())])
            .unwrap();

        let hits = session.search_tickets("checkout");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "REQ-001");
    }
}
