use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::NaiveDate;
use clap::Subcommand;
use std::path::Path;
use triage_core::session::Session;
use triage_core::task::TaskPatch;
use triage_core::types::TaskStatus;

#[derive(Subcommand)]
pub enum TaskSubcommand {
    /// Schedule a task into a sprint, from a backlog ticket or with a title
    Add {
        #[arg(long)]
        sprint: String,
        /// Ticket to schedule (title is copied from it)
        #[arg(long, conflicts_with = "title")]
        ticket: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        /// Start date (default: sprint start)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// End date (default: sprint end)
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// List the tasks of a sprint
    List {
        #[arg(long)]
        sprint: String,
    },
    /// Edit a task (dates are taken as given, no window re-check)
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        effort: Option<u32>,
        /// todo, in-progress, or done
        #[arg(long)]
        status: Option<TaskStatus>,
    },
    /// Delete a task
    Delete { id: String },
}

pub fn run(root: &Path, subcmd: TaskSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TaskSubcommand::Add {
            sprint,
            ticket,
            title,
            assignee,
            start,
            end,
        } => add(root, &sprint, ticket, title, assignee, start, end, json),
        TaskSubcommand::List { sprint } => list(root, &sprint, json),
        TaskSubcommand::Edit {
            id,
            title,
            assignee,
            start,
            end,
            effort,
            status,
        } => edit(
            root,
            &id,
            TaskPatch {
                title,
                assignee,
                start_date: start,
                end_date: end,
                effort,
                status,
            },
            json,
        ),
        TaskSubcommand::Delete { id } => delete(root, &id, json),
    }
}

#[allow(clippy::too_many_arguments)]
fn add(
    root: &Path,
    sprint_id: &str,
    ticket: Option<String>,
    title: Option<String>,
    assignee: Option<String>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    json: bool,
) -> anyhow::Result<()> {
    let mut session = Session::load(root).context("failed to load project")?;
    let sprint = session.sprint(sprint_id)?;
    let start = start.unwrap_or(sprint.start_date);
    let end = end.unwrap_or(sprint.end_date);

    let task = session.add_task(sprint_id, ticket, title, assignee, start, end)?;

    if json {
        print_json(&task)?;
    } else {
        println!(
            "Added task [{}] '{}': {} to {} ({} day{})",
            task.id,
            task.title,
            task.start_date,
            task.end_date,
            task.effort,
            if task.effort == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

fn list(root: &Path, sprint_id: &str, json: bool) -> anyhow::Result<()> {
    let session = Session::load(root).context("failed to load project")?;
    session.sprint(sprint_id)?;
    let tasks = session.tasks_for_sprint(sprint_id);

    if json {
        print_json(&tasks)?;
        return Ok(());
    }

    if tasks.is_empty() {
        println!("No tasks in {sprint_id}.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                t.title.clone(),
                t.assignee.clone(),
                t.start_date.to_string(),
                t.end_date.to_string(),
                t.effort.to_string(),
                t.status.to_string(),
                t.ticket_id.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print_table(
        &[
            "ID", "TITLE", "ASSIGNEE", "START", "END", "EFFORT", "STATUS", "TICKET",
        ],
        rows,
    );
    Ok(())
}

fn edit(root: &Path, id: &str, patch: TaskPatch, json: bool) -> anyhow::Result<()> {
    let mut session = Session::load(root).context("failed to load project")?;
    let task = session.edit_task(id, patch)?;

    if json {
        print_json(&task)?;
    } else {
        println!("Updated task [{}]", task.id);
    }
    Ok(())
}

fn delete(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let mut session = Session::load(root).context("failed to load project")?;
    session.delete_task(id)?;

    if json {
        print_json(&serde_json::json!({ "deleted": id }))?;
    } else {
        println!("Deleted task [{id}]");
    }
    Ok(())
}
