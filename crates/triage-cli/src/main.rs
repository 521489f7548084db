mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    sprint::SprintSubcommand, task::TaskSubcommand, ticket::TicketSubcommand,
    user::UserSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "triage",
    about = "Feature-request triage and sprint planning — a four-stage pipeline from intake to delivery",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .triage/ or .git/)
    #[arg(long, global = true, env = "TRIAGE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a triage project in the current directory
    Init {
        /// Project name (default: directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Set or show the acting user
    User {
        #[command(subcommand)]
        subcommand: UserSubcommand,
    },

    /// Manage feature-request tickets
    Ticket {
        #[command(subcommand)]
        subcommand: TicketSubcommand,
    },

    /// Manage sprints
    Sprint {
        #[command(subcommand)]
        subcommand: SprintSubcommand,
    },

    /// Manage sprint tasks
    Task {
        #[command(subcommand)]
        subcommand: TaskSubcommand,
    },

    /// Approved tickets not yet scheduled into any sprint
    Backlog,

    /// Export all tickets as CSV
    Export {
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { name } => cmd::init::run(&root, name.as_deref(), cli.json),
        Commands::User { subcommand } => cmd::user::run(&root, subcommand, cli.json),
        Commands::Ticket { subcommand } => cmd::ticket::run(&root, subcommand, cli.json),
        Commands::Sprint { subcommand } => cmd::sprint::run(&root, subcommand, cli.json),
        Commands::Task { subcommand } => cmd::task::run(&root, subcommand, cli.json),
        Commands::Backlog => cmd::backlog::run(&root, cli.json),
        Commands::Export { out } => cmd::export::run(&root, out.as_deref(), cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
