use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use triage_core::session::Session;

pub fn run(root: &Path, name: Option<&str>, json: bool) -> anyhow::Result<()> {
    let project = match name {
        Some(n) => n.to_string(),
        None => root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "triage".to_string()),
    };

    let config = Session::init(root, project).context("failed to initialize")?;

    if json {
        print_json(&serde_json::json!({
            "project": config.project,
            "root": root.display().to_string(),
        }))?;
    } else {
        println!("Initialized triage project '{}'", config.project);
        println!("Next: triage user set --name <you> --role <BD|BA|PM|DEV>");
    }
    Ok(())
}
