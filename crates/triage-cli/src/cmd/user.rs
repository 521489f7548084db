use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use triage_core::config::Config;
use triage_core::types::Role;

#[derive(Subcommand)]
pub enum UserSubcommand {
    /// Set the acting user and role
    Set {
        #[arg(long)]
        name: String,
        /// BD, BA, PM, or DEV
        #[arg(long)]
        role: Role,
    },
    /// Show the acting user
    Show,
}

pub fn run(root: &Path, subcmd: UserSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        UserSubcommand::Set { name, role } => set(root, &name, role, json),
        UserSubcommand::Show => show(root, json),
    }
}

fn set(root: &Path, name: &str, role: Role, json: bool) -> anyhow::Result<()> {
    let mut config = Config::load(root).context("failed to load config")?;
    config.set_user(name, role);
    config.save(root).context("failed to save config")?;

    if json {
        print_json(&serde_json::json!({ "name": name, "role": role.as_str() }))?;
    } else {
        println!("Acting as {name} ({role})");
    }
    Ok(())
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let user = config.require_user()?;

    if json {
        print_json(user)?;
    } else {
        println!("{} ({})", user.name, user.role);
        println!("Edits: {}", user.role.stage().label());
    }
    Ok(())
}
