//! Error types for mirror-git

use std::path::PathBuf;

/// Result type for mirror-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mirror-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Clone of {url} into {path} failed: {source}")]
    CloneFailed {
        url: String,
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("Fetch from remote '{remote}' failed: {source}")]
    FetchFailed {
        remote: String,
        #[source]
        source: git2::Error,
    },

    #[error("Push to remote '{remote}' failed ({hint}): {source}")]
    PushFailed {
        remote: String,
        hint: String,
        #[source]
        source: git2::Error,
    },

    #[error("Remote '{name}' not found")]
    RemoteNotFound { name: String },

    #[error("Branch '{name}' not found")]
    BranchNotFound { name: String },

    #[error("Reference '{name}' not found")]
    ReferenceNotFound { name: String },
}
