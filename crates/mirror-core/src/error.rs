//! Error types for mirror-core

use std::path::PathBuf;

/// Result type for mirror-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mirror-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The workspace could not be removed. Fatal for the current cycle: a
    /// workspace that cannot be cleaned threatens every future cycle, so
    /// this is never silently swallowed. The path is left in place for the
    /// next cycle to retry.
    #[error("Failed to remove workspace at {path}: {source}")]
    WorkspaceCleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Transport(#[from] mirror_git::Error),

    #[error("Configuration file not found at {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to parse configuration at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
