mod commands;
mod context;

use clap::{Parser, Subcommand};
use context::Project;
use fleetform_core::CancellationToken;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fleetform")]
#[command(about = "Declarative GameLift fleets from a YAML project file", long_about = None)]
struct Cli {
    /// Project file (default: fleet.yaml discovery, or FLEETFORM_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fleet and wait until it is ACTIVE
    Create {
        /// Fleet name in the project file
        name: String,
        /// Delete the fleet already recorded for this name first
        #[arg(long)]
        replace: bool,
    },
    /// Refresh a fleet from GameLift and show it
    Read {
        /// Fleet name in the project file
        name: String,
    },
    /// Push the declared attributes to an existing fleet
    Update {
        /// Fleet name in the project file
        name: String,
    },
    /// Delete a fleet
    Delete {
        /// Fleet name in the project file
        name: String,
    },
    /// Create missing fleets and update existing ones
    Apply {
        /// Fleet name (all fleets when omitted)
        name: Option<String>,
    },
    /// Validate the project file without calling GameLift
    Validate,
    /// List declared fleets and their recorded state
    List,
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Version needs no project file
    if matches!(cli.command, Commands::Version) {
        println!("fleetform {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let project_file = match cli.config {
        Some(path) => path,
        None => fleetform_config::find_project_file()?,
    };
    let project = Project::load(&project_file)?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            on_signal.cancel();
        }
    });

    match cli.command {
        Commands::Create { name, replace } => {
            commands::create::handle(&project, &name, replace, cancel).await
        }
        Commands::Read { name } => commands::read::handle(&project, &name, cancel).await,
        Commands::Update { name } => commands::update::handle(&project, &name, cancel).await,
        Commands::Delete { name } => commands::delete::handle(&project, &name, cancel).await,
        Commands::Apply { name } => commands::apply::handle(&project, name.as_deref(), cancel).await,
        Commands::Validate => commands::validate::handle(&project),
        Commands::List => commands::list::handle(&project).await,
        Commands::Version => Ok(()),
    }
}
