use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;
use triage_core::session::Session;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let session = Session::load(root).context("failed to load project")?;
    let backlog = session.backlog();

    if json {
        print_json(&backlog)?;
        return Ok(());
    }

    if backlog.is_empty() {
        println!("Backlog is empty.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = backlog
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                t.title.clone(),
                t.severity.to_string(),
                t.effort.map(|e| e.to_string()).unwrap_or_default(),
                t.sprint_cycle.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["ID", "TITLE", "SEVERITY", "EFFORT", "SPRINT"], rows);
    Ok(())
}
