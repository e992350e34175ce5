//! The always-retry daemon loop
//!
//! One cycle at a time, no overlap: the workspace is a single mutable
//! resource and the sequential loop is its mutual exclusion. A failed cycle
//! never exits the loop — only cancellation does; operators are expected to
//! watch the logs for persistent failure.

use std::time::{Duration, Instant};

use crate::Result;
use crate::cancel::CancellationToken;
use crate::sync::{SyncOrchestrator, SyncOutcome};

/// Delay before retrying after a failed cycle, distinct from the configured
/// interval so transient failures recover faster than the steady-state
/// cadence.
pub const RETRY_BACKOFF: Duration = Duration::from_secs(5);

const SLEEP_SLICE: Duration = Duration::from_millis(200);

/// One unit of daemon work. The seam keeps the loop testable without a
/// filesystem or network.
pub trait SyncCycle {
    fn run_cycle(&self) -> Result<SyncOutcome>;
}

impl SyncCycle for SyncOrchestrator {
    fn run_cycle(&self) -> Result<SyncOutcome> {
        self.sync()
    }
}

/// Repeats a sync cycle until cancelled.
pub struct DaemonLoop<C> {
    cycle: C,
    interval: Duration,
    backoff: Duration,
}

impl<C: SyncCycle> DaemonLoop<C> {
    pub fn new(cycle: C, interval: Duration) -> Self {
        Self {
            cycle,
            interval,
            backoff: RETRY_BACKOFF,
        }
    }

    /// Shorten the failure backoff. Primarily useful for testing.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Run until `cancel` is tripped.
    ///
    /// Cancellation is checked before each cycle and while sleeping; a
    /// request during the sleep exits promptly instead of waiting out the
    /// full interval. It does not interrupt an in-progress cycle.
    pub fn run(&self, cancel: &CancellationToken) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "daemon loop started"
        );

        while !cancel.is_cancelled() {
            let pause = match self.cycle.run_cycle() {
                Ok(outcome) => {
                    tracing::info!(%outcome, "sync cycle complete");
                    self.interval
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        backoff_secs = self.backoff.as_secs(),
                        "sync cycle failed; retrying after backoff"
                    );
                    self.backoff
                }
            };
            interruptible_sleep(pause, cancel);
        }

        tracing::info!("daemon loop cancelled");
    }
}

fn interruptible_sleep(total: Duration, cancel: &CancellationToken) {
    let deadline = Instant::now() + total;
    while !cancel.is_cancelled() {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        std::thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}
