//! Mirror and sync command implementations

use colored::Colorize;

use mirror_core::{Settings, SyncOrchestrator};

use crate::error::Result;

/// Run the one-shot mirror command.
pub fn run_mirror(settings: Settings) -> Result<()> {
    println!(
        "{} Mirroring {} -> {}",
        "=>".blue().bold(),
        settings.source.url.cyan(),
        settings.target.url.cyan()
    );

    let orchestrator = SyncOrchestrator::new(settings);
    let outcome = orchestrator.mirror()?;

    println!("{} {}", "OK".green().bold(), outcome);
    Ok(())
}

/// Run the one-shot sync command.
pub fn run_sync(settings: Settings) -> Result<()> {
    println!(
        "{} Syncing {} -> {}",
        "=>".blue().bold(),
        settings.source.url.cyan(),
        settings.target.url.cyan()
    );

    let orchestrator = SyncOrchestrator::new(settings);
    let outcome = orchestrator.sync()?;

    println!("{} {}", "OK".green().bold(), outcome);
    Ok(())
}
