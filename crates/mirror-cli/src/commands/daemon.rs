//! Daemon command implementation

use std::time::Duration;

use colored::Colorize;

use mirror_core::{CancellationToken, DaemonLoop, Settings, SyncOrchestrator};

use crate::error::Result;

/// Run the sync loop until interrupted.
///
/// The loop itself is synchronous and owns this thread; a one-worker tokio
/// runtime watches for Ctrl-C and trips the shared cancellation token. The
/// loop notices at the next iteration boundary or sleep poll, so an
/// in-progress fetch or push always finishes first.
pub fn run_daemon(settings: Settings) -> Result<()> {
    let interval = Duration::from_secs(settings.sync_interval);
    println!(
        "{} Daemon started (interval {}s). Press Ctrl-C to stop.",
        "=>".blue().bold(),
        settings.sync_interval
    );

    let token = CancellationToken::new();
    let signal_token = token.clone();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received; stopping after the current cycle");
            signal_token.cancel();
        }
    });

    let daemon = DaemonLoop::new(SyncOrchestrator::new(settings), interval);
    daemon.run(&token);

    println!("{} Daemon stopped.", "OK".green().bold());
    Ok(())
}
