use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use std::path::Path;
use triage_core::session::Session;
use triage_core::sprint::{Sprint, SprintPatch, SprintPhase, UtilizationBand};
use triage_core::types::SprintStatus;

#[derive(Subcommand)]
pub enum SprintSubcommand {
    /// Create a sprint (PM only; must start on a Monday)
    Create {
        #[arg(long)]
        goal: String,
        /// Start date, YYYY-MM-DD (must be a Monday)
        #[arg(long)]
        start: NaiveDate,
        /// Capacity in man-days
        #[arg(long)]
        capacity: u32,
        /// Display name (default: "Sprint {n}")
        #[arg(long)]
        name: Option<String>,
    },
    /// List sprints grouped as active / upcoming / past
    List,
    /// Show one sprint with its tasks and utilization
    Show { id: String },
    /// Edit a sprint (PM only; a new start re-derives the end date)
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        goal: Option<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        capacity: Option<u32>,
        /// planned, active, or completed
        #[arg(long)]
        status: Option<SprintStatus>,
    },
    /// Delete a sprint and all its tasks (PM only)
    Delete { id: String },
}

pub fn run(root: &Path, subcmd: SprintSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SprintSubcommand::Create {
            goal,
            start,
            capacity,
            name,
        } => create(root, name, goal, start, capacity, json),
        SprintSubcommand::List => list(root, json),
        SprintSubcommand::Show { id } => show(root, &id, json),
        SprintSubcommand::Edit {
            id,
            name,
            goal,
            start,
            capacity,
            status,
        } => edit(
            root,
            &id,
            SprintPatch {
                name,
                goal,
                start_date: start,
                capacity,
                status,
            },
            json,
        ),
        SprintSubcommand::Delete { id } => delete(root, &id, json),
    }
}

fn create(
    root: &Path,
    name: Option<String>,
    goal: String,
    start: NaiveDate,
    capacity: u32,
    json: bool,
) -> anyhow::Result<()> {
    let mut session = Session::load(root).context("failed to load project")?;
    let sprint = session.create_sprint(name, goal, start, capacity)?;

    if json {
        print_json(&sprint)?;
    } else {
        println!(
            "Created {} '{}': {} to {}, capacity {}",
            sprint.id, sprint.name, sprint.start_date, sprint.end_date, sprint.capacity
        );
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let session = Session::load(root).context("failed to load project")?;

    if json {
        print_json(&session.sprints)?;
        return Ok(());
    }

    if session.sprints.is_empty() {
        println!("No sprints.");
        return Ok(());
    }

    let today = Utc::now().date_naive();
    for (label, phase) in [
        ("Active", SprintPhase::Active),
        ("Upcoming", SprintPhase::Upcoming),
        ("Past", SprintPhase::Past),
    ] {
        let group: Vec<&Sprint> = session
            .sprints
            .iter()
            .filter(|s| s.phase(today) == phase)
            .collect();
        if group.is_empty() {
            continue;
        }
        println!("{label}:");
        let rows: Vec<Vec<String>> = group
            .iter()
            .map(|s| {
                let (effort, pct) = session
                    .sprint_load(&s.id)
                    .unwrap_or((0, 0));
                vec![
                    s.id.clone(),
                    s.name.clone(),
                    s.start_date.to_string(),
                    s.end_date.to_string(),
                    format!("{effort}/{}", s.capacity),
                    format!("{pct}%"),
                ]
            })
            .collect();
        print_table(&["ID", "NAME", "START", "END", "LOAD", "UTIL"], rows);
        println!();
    }
    Ok(())
}

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let session = Session::load(root).context("failed to load project")?;
    let sprint = session.sprint(id)?;
    let (effort, pct) = session.sprint_load(id)?;
    let tasks = session.tasks_for_sprint(id);

    if json {
        print_json(&serde_json::json!({
            "sprint": sprint,
            "committed_effort": effort,
            "utilization_pct": pct,
            "tasks": tasks,
        }))?;
        return Ok(());
    }

    let band = match UtilizationBand::of(pct) {
        UtilizationBand::Healthy => "",
        UtilizationBand::Warn => "  (near capacity)",
        UtilizationBand::Over => "  (OVERCOMMITTED)",
    };

    println!("Sprint: {} '{}'", sprint.id, sprint.name);
    println!("Goal:        {}", sprint.goal);
    println!("Window:      {} to {}", sprint.start_date, sprint.end_date);
    println!("Status:      {}", sprint.status);
    println!("Capacity:    {} man-days", sprint.capacity);
    println!("Committed:   {effort} man-days");
    println!("Utilization: {pct}%{band}");

    if !tasks.is_empty() {
        println!();
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
                ]
            })
            .collect();
        print_table(
            &["ID", "TITLE", "ASSIGNEE", "START", "END", "EFFORT", "STATUS"],
            rows,
        );
    }
    Ok(())
}

fn edit(root: &Path, id: &str, patch: SprintPatch, json: bool) -> anyhow::Result<()> {
    let mut session = Session::load(root).context("failed to load project")?;
    let sprint = session.edit_sprint(id, patch)?;

    if json {
        print_json(&sprint)?;
    } else {
        println!(
            "Updated {}: {} to {}",
            sprint.id, sprint.start_date, sprint.end_date
        );
    }
    Ok(())
}

fn delete(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let mut session = Session::load(root).context("failed to load project")?;
    let removed = session.delete_sprint(id)?;

    if json {
        print_json(&serde_json::json!({ "deleted": id, "tasks_removed": removed }))?;
    } else {
        println!("Deleted {id} and {removed} task(s)");
    }
    Ok(())
}
