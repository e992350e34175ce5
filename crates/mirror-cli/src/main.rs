//! Repo Mirror CLI
//!
//! One-shot and daemonized mirroring of a Git repository from a source
//! remote to a target remote.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins when set; otherwise --verbose selects the level.
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(cli.verbose)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let settings = commands::resolve_settings(cli.config, cli.overrides.into_partial())?;

    match cli.command.unwrap_or(Commands::Sync) {
        Commands::Mirror => commands::run_mirror(settings),
        Commands::Sync => commands::run_sync(settings),
        Commands::Daemon => commands::run_daemon(settings),
    }
}
