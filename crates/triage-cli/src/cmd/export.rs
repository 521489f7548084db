use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use triage_core::export;
use triage_core::session::Session;

pub fn run(root: &Path, out: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let session = Session::load(root).context("failed to load project")?;

    match out {
        Some(path) => {
            export::write_csv(&session.tickets, path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            if json {
                print_json(&serde_json::json!({
                    "path": path.display().to_string(),
                    "tickets": session.tickets.len(),
                }))?;
            } else {
                println!(
                    "Exported {} ticket(s) to {}",
                    session.tickets.len(),
                    path.display()
                );
            }
        }
        None => print!("{}", export::to_csv(&session.tickets)),
    }
    Ok(())
}
