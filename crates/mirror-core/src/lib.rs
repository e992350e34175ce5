//! Synchronization engine for Repo Mirror
//!
//! Orchestrates mirroring a Git repository from a source remote to a target
//! remote through a single local working copy:
//!
//! - **Settings**: endpoint/workspace/interval configuration with
//!   file < environment < CLI precedence
//! - **Workspace**: the one on-disk working copy, with forced cleanup
//! - **SyncOrchestrator**: the mirror-vs-sync state machine
//! - **DaemonLoop**: repeats sync on an interval with bounded retry backoff
//!
//! # Architecture
//!
//! `mirror-core` sits between the CLI and the transport layer:
//!
//! ```text
//!   mirror-cli
//!       |
//!  mirror-core
//!       |
//!   mirror-git
//! ```

pub mod cancel;
pub mod config;
pub mod daemon;
pub mod error;
pub mod sync;
pub mod workspace;

pub use cancel::CancellationToken;
pub use config::{Endpoint, PartialEndpoint, PartialSettings, Settings};
pub use error::{Error, Result};
pub use daemon::{DaemonLoop, SyncCycle, RETRY_BACKOFF};
pub use sync::{SyncOrchestrator, SyncOutcome, SOURCE_REMOTE, TARGET_REMOTE};
pub use workspace::{Workspace, WorkspaceState};
