use crate::config::PromotionMode;
use crate::error::{Result, TriageError};
use crate::sprint::Sprint;
use crate::task::{Task, UNASSIGNED};
use crate::ticket::Ticket;
use crate::types::{PmStatus, TaskStatus};
use chrono::{Duration, Utc};
use tracing::debug;

/// Derive a sprint task from an approved, sprint-assigned ticket.
///
/// Fires after every successful ticket update; returns `Ok(None)` when the
/// ticket is not eligible or a task for this (ticket, sprint) pair already
/// exists, so re-saving an approved ticket never duplicates work.
///
/// A `sprint_cycle` naming no known sprint is skipped in lenient mode and an
/// error in strict mode.
pub fn promote(
    ticket: &Ticket,
    sprints: &[Sprint],
    tasks: &[Task],
    mode: PromotionMode,
) -> Result<Option<Task>> {
    let Some(sprint_id) = ticket.sprint_cycle.as_deref() else {
        return Ok(None);
    };
    if ticket.pm_status != PmStatus::Approved {
        return Ok(None);
    }

    let Some(sprint) = sprints.iter().find(|s| s.id == sprint_id) else {
        return match mode {
            PromotionMode::Lenient => {
                debug!(ticket = %ticket.id, sprint = %sprint_id, "promotion skipped: unknown sprint");
                Ok(None)
            }
            PromotionMode::Strict => Err(TriageError::SprintNotFound(sprint_id.to_string())),
        };
    };

    let already = tasks
        .iter()
        .any(|t| t.sprint_id == sprint.id && t.ticket_id.as_deref() == Some(ticket.id.as_str()));
    if already {
        return Ok(None);
    }

    let days = ticket.effort.map(|s| s.days()).unwrap_or(1);
    let now = Utc::now();
    let task = Task {
        id: Task::new_id(),
        sprint_id: sprint.id.clone(),
        ticket_id: Some(ticket.id.clone()),
        title: ticket.title.clone(),
        assignee: UNASSIGNED.to_string(),
        start_date: sprint.start_date,
        end_date: sprint.start_date + Duration::days(i64::from(days)),
        effort: days,
        status: TaskStatus::ToDo,
        created_at: now,
        updated_at: now,
    };
    debug!(ticket = %ticket.id, sprint = %sprint.id, task = %task.id, "ticket promoted to task");
    Ok(Some(task))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::TicketField;
    use crate::types::TShirtSize;
    use chrono::NaiveDate;

    fn sprint() -> Sprint {
        Sprint::new(
            "SPRINT-1",
            "Sprint 1",
            "",
            NaiveDate::from_ymd_opt(2024, 10, 14).unwrap(),
            20,
        )
        .unwrap()
    }

    fn eligible_ticket() -> Ticket {
        let mut ticket = Ticket::new("REQ-001");
        ticket.apply(TicketField::Title("One-Click Checkout".into()));
        ticket.apply(TicketField::PmStatus(PmStatus::Approved));
        ticket.apply(TicketField::Effort(Some(TShirtSize::M)));
        ticket.apply(TicketField::SprintCycle(Some("SPRINT-1".into())));
        ticket
    }

    #[test]
    fn promotes_approved_sprint_assigned_ticket() {
        let task = promote(&eligible_ticket(), &[sprint()], &[], PromotionMode::Lenient)
            .unwrap()
            .unwrap();
        assert_eq!(task.title, "One-Click Checkout");
        assert_eq!(task.ticket_id.as_deref(), Some("REQ-001"));
        assert_eq!(task.effort, 3);
        assert_eq!(task.start_date, NaiveDate::from_ymd_opt(2024, 10, 14).unwrap());
        // End is start + effort calendar days.
        assert_eq!(task.end_date, NaiveDate::from_ymd_opt(2024, 10, 17).unwrap());
        assert_eq!(task.assignee, UNASSIGNED);
        assert_eq!(task.status, TaskStatus::ToDo);
    }

    #[test]
    fn unset_effort_defaults_to_one_day() {
        let mut ticket = eligible_ticket();
        ticket.apply(TicketField::Effort(None));
        let task = promote(&ticket, &[sprint()], &[], PromotionMode::Lenient)
            .unwrap()
            .unwrap();
        assert_eq!(task.effort, 1);
        assert_eq!(task.end_date, NaiveDate::from_ymd_opt(2024, 10, 15).unwrap());
    }

    #[test]
    fn not_approved_is_skipped() {
        let mut ticket = eligible_ticket();
        ticket.apply(TicketField::PmStatus(PmStatus::OnHold));
        let out = promote(&ticket, &[sprint()], &[], PromotionMode::Lenient).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn no_sprint_cycle_is_skipped() {
        let mut ticket = eligible_ticket();
        ticket.apply(TicketField::SprintCycle(None));
        let out = promote(&ticket, &[sprint()], &[], PromotionMode::Lenient).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn idempotent_per_ticket_sprint_pair() {
        let s = sprint();
        let ticket = eligible_ticket();
        let first = promote(&ticket, std::slice::from_ref(&s), &[], PromotionMode::Lenient)
            .unwrap()
            .unwrap();
        let second = promote(
            &ticket,
            std::slice::from_ref(&s),
            std::slice::from_ref(&first),
            PromotionMode::Lenient,
        )
        .unwrap();
        assert!(second.is_none());
    }

    #[test]
    fn unknown_sprint_lenient_skips_strict_errors() {
        let mut ticket = eligible_ticket();
        ticket.apply(TicketField::SprintCycle(Some("SPRINT-9".into())));

        let out = promote(&ticket, &[sprint()], &[], PromotionMode::Lenient).unwrap();
        assert!(out.is_none());

        let err = promote(&ticket, &[sprint()], &[], PromotionMode::Strict).unwrap_err();
        assert!(matches!(err, TriageError::SprintNotFound(_)));
    }
}
