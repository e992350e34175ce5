//! Cooperative cancellation for the daemon loop

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A clonable flag checked at loop-iteration boundaries and during sleeps.
///
/// Cancellation is cooperative: it never interrupts an in-progress fetch or
/// push, only the points that poll it.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
