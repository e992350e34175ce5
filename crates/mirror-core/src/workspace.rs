//! The single local working copy
//!
//! All repository state is serialized into one path; the workspace handle is
//! passed through calls rather than held as ambient global state, so tests
//! can point it anywhere.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Observed condition of the workspace slot, re-evaluated each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceState {
    /// The path does not exist.
    Missing,
    /// The path exists but git2 cannot open it as a repository.
    Invalid,
    /// A well-formed repository.
    Ready,
}

/// Handle to the on-disk working copy slot.
#[derive(Debug, Clone)]
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Evaluate the slot. `Missing` and `Invalid` both route the caller to a
    /// full mirror, but the distinction is kept for differentiated handling.
    pub fn state(&self) -> WorkspaceState {
        if !self.path.exists() {
            WorkspaceState::Missing
        } else if mirror_git::is_repository(&self.path) {
            WorkspaceState::Ready
        } else {
            WorkspaceState::Invalid
        }
    }

    /// Remove the workspace directory and everything beneath it.
    ///
    /// libgit2 marks object files read-only, which makes a naive recursive
    /// delete fail on Windows, so the read-only attribute is cleared from
    /// the whole tree first. A no-op when the path is already absent.
    pub fn cleanup(&self) -> Result<()> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "workspace already absent");
            return Ok(());
        }

        clear_readonly(&self.path)
            .and_then(|()| fs::remove_dir_all(&self.path))
            .map_err(|source| Error::WorkspaceCleanup {
                path: self.path.clone(),
                source,
            })?;

        tracing::info!(path = %self.path.display(), "workspace removed");
        Ok(())
    }
}

fn clear_readonly(path: &Path) -> io::Result<()> {
    // symlink_metadata so a link target outside the workspace is never touched
    let metadata = fs::symlink_metadata(path)?;

    let mut perms = metadata.permissions();
    if perms.readonly() {
        perms.set_readonly(false);
        fs::set_permissions(path, perms)?;
    }

    if metadata.is_dir() {
        for entry in fs::read_dir(path)? {
            clear_readonly(&entry?.path())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn state_is_missing_for_absent_path() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path().join("nope"));
        assert_eq!(workspace.state(), WorkspaceState::Missing);
    }

    #[test]
    fn state_is_invalid_for_plain_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("file.txt"), "not a repo").unwrap();
        let workspace = Workspace::new(dir.path());
        assert_eq!(workspace.state(), WorkspaceState::Invalid);
    }

    #[test]
    fn state_is_ready_for_repository() {
        let dir = TempDir::new().unwrap();
        git2::Repository::init(dir.path()).unwrap();
        let workspace = Workspace::new(dir.path());
        assert_eq!(workspace.state(), WorkspaceState::Ready);
    }

    #[test]
    fn cleanup_removes_nested_tree() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("work");
        std::fs::create_dir_all(root.join("a/b")).unwrap();
        std::fs::write(root.join("a/b/file.txt"), "x").unwrap();

        Workspace::new(&root).cleanup().unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn cleanup_clears_readonly_entries_first() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("work");
        std::fs::create_dir_all(root.join("objects")).unwrap();
        let object = root.join("objects/pack-1234");
        std::fs::write(&object, "data").unwrap();

        let mut perms = std::fs::metadata(&object).unwrap().permissions();
        perms.set_readonly(true);
        std::fs::set_permissions(&object, perms).unwrap();

        Workspace::new(&root).cleanup().unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn cleanup_is_idempotent_on_absent_path() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path().join("never-created"));
        workspace.cleanup().unwrap();
        workspace.cleanup().unwrap();
    }
}
