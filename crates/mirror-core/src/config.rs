//! Configuration for the mirroring engine
//!
//! Settings are resolved by merging two layers, later sources overriding
//! earlier ones:
//!
//! 1. TOML configuration file (lowest precedence)
//! 2. Environment/CLI overrides, collected by the CLI into a
//!    [`PartialSettings`] overlay (clap's `env` support already orders
//!    environment below flags)
//!
//! Missing layers are skipped; the merged result must name both endpoint
//! URLs and the workspace path or finalization fails.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use mirror_git::RemoteAuth;

use crate::{Error, Result};

/// Branch used when an endpoint does not name one.
pub const DEFAULT_BRANCH: &str = "main";

/// Steady-state daemon interval when the configuration does not name one.
pub const DEFAULT_SYNC_INTERVAL: u64 = 300;

/// One side of the mirror: a remote repository plus its authentication.
///
/// Immutable once resolved; exactly two instances exist per process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    pub url: String,
    pub branch: String,
    pub username: Option<String>,
    pub token: Option<String>,
}

impl Endpoint {
    /// Authentication material for the transport layer.
    pub fn auth(&self) -> RemoteAuth {
        RemoteAuth {
            username: self.username.clone(),
            token: self.token.clone(),
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub source: Endpoint,
    pub target: Endpoint,
    pub local_path: PathBuf,
    pub sync_interval: u64,
}

impl Settings {
    fn validate(&self) -> Result<()> {
        if self.source.url.is_empty() {
            return Err(Error::invalid_config("source.url must not be empty"));
        }
        if self.target.url.is_empty() {
            return Err(Error::invalid_config("target.url must not be empty"));
        }
        if self.sync_interval == 0 {
            return Err(Error::invalid_config(
                "sync_interval must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Endpoint fields as they appear in a single configuration layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialEndpoint {
    pub url: Option<String>,
    pub branch: Option<String>,
    pub username: Option<String>,
    pub token: Option<String>,
}

impl PartialEndpoint {
    fn merge(&mut self, overlay: PartialEndpoint) {
        if overlay.url.is_some() {
            self.url = overlay.url;
        }
        if overlay.branch.is_some() {
            self.branch = overlay.branch;
        }
        if overlay.username.is_some() {
            self.username = overlay.username;
        }
        if overlay.token.is_some() {
            self.token = overlay.token;
        }
    }

    fn finalize(self, which: &str) -> Result<Endpoint> {
        let url = self
            .url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::invalid_config(format!("{which}.url is required")))?;

        Ok(Endpoint {
            url,
            branch: self.branch.unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            username: self.username,
            token: self.token,
        })
    }
}

/// Settings as they appear in a single configuration layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialSettings {
    pub source: PartialEndpoint,
    pub target: PartialEndpoint,
    pub local_path: Option<PathBuf>,
    pub sync_interval: Option<u64>,
}

impl PartialSettings {
    /// Load one layer from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        tracing::debug!(path = %path.display(), "loading configuration file");
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    /// Apply a higher-precedence layer on top of this one.
    pub fn merge(&mut self, overlay: PartialSettings) {
        self.source.merge(overlay.source);
        self.target.merge(overlay.target);
        if overlay.local_path.is_some() {
            self.local_path = overlay.local_path;
        }
        if overlay.sync_interval.is_some() {
            self.sync_interval = overlay.sync_interval;
        }
    }

    /// Finalize the merged layers into validated settings.
    pub fn into_settings(self) -> Result<Settings> {
        let source = self.source.finalize("source")?;
        let target = self.target.finalize("target")?;
        let local_path = self
            .local_path
            .ok_or_else(|| Error::invalid_config("local_path is required"))?;

        let settings = Settings {
            source,
            target,
            local_path,
            sync_interval: self.sync_interval.unwrap_or(DEFAULT_SYNC_INTERVAL),
        };
        settings.validate()?;
        Ok(settings)
    }
}

/// Resolve settings from an optional file layer plus an override layer.
///
/// `file` is the explicit configuration path, if any; overrides come from
/// the CLI (which already folds environment variables in at the right
/// precedence).
pub fn resolve(file: Option<&Path>, overrides: PartialSettings) -> Result<Settings> {
    let mut merged = match file {
        Some(path) => PartialSettings::load(path)?,
        None => {
            tracing::debug!("no configuration file; using overrides only");
            PartialSettings::default()
        }
    };
    merged.merge(overrides);
    merged.into_settings()
}
