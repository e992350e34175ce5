//! Mirror/sync orchestration
//!
//! The orchestrator decides between two passes:
//!
//! - **mirror**: full clone of the source, push to the target, no residual
//!   local copy — a transient pass-through.
//! - **sync**: incremental — fetch, compare tips, checkout-and-push only
//!   when the source has advanced. Falls back to mirror when no usable
//!   workspace exists.
//!
//! Tip comparison is exact commit-id equality, not ancestry: the local
//! branch is only ever advanced by this code path, never diverged by hand.

use std::sync::Arc;

use mirror_git::ResolverChain;

use crate::Result;
use crate::config::Settings;
use crate::workspace::{Workspace, WorkspaceState};

/// Fetch-only remote tracking the source endpoint.
pub const SOURCE_REMOTE: &str = "source";

/// Push target remote tracking the target endpoint.
pub const TARGET_REMOTE: &str = "origin";

/// What a successful orchestration cycle did.
///
/// Failures travel through `Err`; the daemon only distinguishes success
/// (normal interval) from failure (short backoff).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Local and source tips already match; the push was skipped.
    UpToDate,
    /// The local branch advanced and was pushed to the target.
    Updated,
    /// No usable workspace existed; a full mirror pass ran instead.
    MirroredFresh,
}

impl std::fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SyncOutcome::UpToDate => "up to date",
            SyncOutcome::Updated => "updated",
            SyncOutcome::MirroredFresh => "mirrored fresh",
        })
    }
}

/// Drives one source/target pair through mirror and sync cycles.
pub struct SyncOrchestrator {
    settings: Settings,
    resolver: Arc<ResolverChain>,
}

impl SyncOrchestrator {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            resolver: Arc::new(ResolverChain::standard()),
        }
    }

    /// Swap the credential chain (test doubles, platform stores).
    pub fn with_resolver(mut self, resolver: Arc<ResolverChain>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Handle to the configured workspace slot.
    pub fn workspace(&self) -> Workspace {
        Workspace::new(&self.settings.local_path)
    }

    /// Full mirror: destroy any existing workspace, clone the source branch
    /// fresh, re-point `origin` at the target, push, destroy the workspace
    /// again. On a failed clone or push the workspace is cleaned up
    /// best-effort before the error is returned.
    pub fn mirror(&self) -> Result<SyncOutcome> {
        let workspace = self.workspace();
        tracing::info!(
            source = %self.settings.source.url,
            target = %self.settings.target.url,
            "starting full mirror"
        );

        workspace.cleanup()?;

        match self.mirror_pass(&workspace) {
            Ok(()) => {
                workspace.cleanup()?;
                Ok(SyncOutcome::MirroredFresh)
            }
            Err(e) => {
                if let Err(cleanup_err) = workspace.cleanup() {
                    tracing::warn!(
                        error = %cleanup_err,
                        "cleanup after failed mirror pass also failed"
                    );
                }
                Err(e)
            }
        }
    }

    fn mirror_pass(&self, workspace: &Workspace) -> Result<()> {
        let source = &self.settings.source;
        let target = &self.settings.target;

        let repo = mirror_git::clone_branch(
            &source.url,
            &source.branch,
            workspace.path(),
            &source.auth(),
            &self.resolver,
        )?;

        // The clone leaves `origin` pointing at the source; re-point it at
        // the push target.
        mirror_git::ensure_remote(&repo, TARGET_REMOTE, &target.url)?;
        mirror_git::push_branch(
            &repo,
            TARGET_REMOTE,
            &source.branch,
            &target.branch,
            &target.auth(),
            &self.resolver,
        )?;
        Ok(())
    }

    /// Incremental sync. Credentials are re-resolved for every fetch and
    /// push; nothing is cached across operations.
    pub fn sync(&self) -> Result<SyncOutcome> {
        let workspace = self.workspace();
        let state = workspace.state();

        if state != WorkspaceState::Ready {
            tracing::info!(?state, "no usable workspace; falling back to full mirror");
            return self.mirror();
        }

        let source = &self.settings.source;
        let target = &self.settings.target;
        let repo = mirror_git::open(workspace.path())?;

        mirror_git::ensure_remote(&repo, SOURCE_REMOTE, &source.url)?;
        mirror_git::ensure_remote(&repo, TARGET_REMOTE, &target.url)?;

        mirror_git::fetch_branch(
            &repo,
            SOURCE_REMOTE,
            &source.branch,
            &source.auth(),
            &self.resolver,
        )?;

        let fetched = mirror_git::remote_tracking_tip(&repo, SOURCE_REMOTE, &source.branch)?;
        let local = mirror_git::branch_tip(&repo, &source.branch)?;

        if fetched == local {
            tracing::info!(tip = %local, "source unchanged; nothing to push");
            return Ok(SyncOutcome::UpToDate);
        }

        tracing::info!(%local, %fetched, "source advanced; fast-forwarding and pushing");
        mirror_git::fast_forward(&repo, &source.branch, fetched)?;
        mirror_git::push_branch(
            &repo,
            TARGET_REMOTE,
            &source.branch,
            &target.branch,
            &target.auth(),
            &self.resolver,
        )?;
        Ok(SyncOutcome::Updated)
    }
}
