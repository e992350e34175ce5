//! Command implementations

mod daemon;
mod sync;

pub use daemon::run_daemon;
pub use sync::{run_mirror, run_sync};

use std::path::PathBuf;

use mirror_core::{PartialSettings, Settings, config};

use crate::error::Result;

/// Conventional configuration file name, looked up in the working directory
/// when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "repo-mirror.toml";

/// Merge the file layer (explicit path, or the conventional one if present)
/// with the env/CLI override layer.
pub fn resolve_settings(
    config_path: Option<PathBuf>,
    overrides: PartialSettings,
) -> Result<Settings> {
    let file = config_path.or_else(|| {
        let default = PathBuf::from(DEFAULT_CONFIG_PATH);
        default.is_file().then_some(default)
    });
    Ok(config::resolve(file.as_deref(), overrides)?)
}
