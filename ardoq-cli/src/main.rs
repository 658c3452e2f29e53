//! Ardoq sync CLI.
//!
//! # Usage
//!
//! ```text
//! ardoq sync <manifest> [--simulate] [--json]
//! ardoq diff <manifest>
//! ardoq find <workspace> (--name <name> [--exact] | --field <field> --value <value>) [--json]
//! ardoq delete component|reference <id> [--simulate]
//! ardoq config show|path
//! ```
//!
//! Connection settings come from `~/.ardoq/config.yaml`, overridden by
//! `ARDOQ_API_HOST`, `ARDOQ_API_TOKEN` and `ARDOQ_ORG_LABEL`.

mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::{
    config::ConfigCommand, delete::DeleteArgs, diff::DiffArgs, find::FindArgs, sync::SyncArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "ardoq",
    version,
    about = "Declaratively sync components and references into Ardoq workspaces",
    long_about = None,
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create, update or reuse everything a manifest describes.
    Sync(SyncArgs),

    /// Show what `sync` would change, without changing it.
    Diff(DiffArgs),

    /// Search components in a workspace.
    Find(FindArgs),

    /// Delete a component or reference by identifier.
    Delete(DeleteArgs),

    /// Inspect client configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Find(args) => args.run(),
        Commands::Delete(args) => args.run(),
        Commands::Config { command } => commands::config::run(command),
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
