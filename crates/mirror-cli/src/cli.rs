//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use mirror_core::{PartialEndpoint, PartialSettings};

/// Repo Mirror - keep a target Git remote in step with a source remote
#[derive(Parser, Debug)]
#[command(name = "repo-mirror")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the TOML configuration file
    #[arg(short, long, global = true, env = "REPO_MIRROR_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    /// The command to run (defaults to `sync`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Full mirror: clone the source fresh and push it to the target
    ///
    /// Destroys any existing workspace first and leaves none behind.
    Mirror,

    /// Incremental sync: fetch, compare tips, push only when advanced
    ///
    /// Falls back to a full mirror when no usable workspace exists.
    Sync,

    /// Run sync repeatedly until interrupted
    ///
    /// Sleeps the configured interval after a successful cycle and a short
    /// fixed backoff after a failed one; a single failure never stops it.
    Daemon,
}

/// Configuration overrides.
///
/// Flags beat their environment variables, which beat the configuration
/// file.
#[derive(Args, Debug, Clone, Default)]
pub struct OverrideArgs {
    /// Source repository URL
    #[arg(long, global = true, env = "REPO_MIRROR_SOURCE_URL")]
    pub source_url: Option<String>,

    /// Branch to mirror from the source
    #[arg(long, global = true, env = "REPO_MIRROR_SOURCE_BRANCH")]
    pub source_branch: Option<String>,

    /// Username for the source remote
    #[arg(long, global = true, env = "REPO_MIRROR_SOURCE_USERNAME")]
    pub source_username: Option<String>,

    /// Token for the source remote
    #[arg(long, global = true, env = "REPO_MIRROR_SOURCE_TOKEN")]
    pub source_token: Option<String>,

    /// Target repository URL
    #[arg(long, global = true, env = "REPO_MIRROR_TARGET_URL")]
    pub target_url: Option<String>,

    /// Branch to update on the target
    #[arg(long, global = true, env = "REPO_MIRROR_TARGET_BRANCH")]
    pub target_branch: Option<String>,

    /// Username for the target remote
    #[arg(long, global = true, env = "REPO_MIRROR_TARGET_USERNAME")]
    pub target_username: Option<String>,

    /// Token for the target remote
    #[arg(long, global = true, env = "REPO_MIRROR_TARGET_TOKEN")]
    pub target_token: Option<String>,

    /// Local workspace path
    #[arg(long, global = true, env = "REPO_MIRROR_LOCAL_PATH")]
    pub local_path: Option<PathBuf>,

    /// Seconds between daemon sync cycles
    #[arg(long, global = true, env = "REPO_MIRROR_SYNC_INTERVAL")]
    pub sync_interval: Option<u64>,
}

impl OverrideArgs {
    /// Convert into the engine's override layer.
    pub fn into_partial(self) -> PartialSettings {
        PartialSettings {
            source: PartialEndpoint {
                url: self.source_url,
                branch: self.source_branch,
                username: self.source_username,
                token: self.source_token,
            },
            target: PartialEndpoint {
                url: self.target_url,
                branch: self.target_branch,
                username: self.target_username,
                token: self.target_token,
            },
            local_path: self.local_path,
            sync_interval: self.sync_interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["repo-mirror"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn subcommands_parse() {
        let cli = Cli::try_parse_from(["repo-mirror", "daemon"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Daemon));
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["repo-mirror", "frobnicate"]).is_err());
    }

    #[test]
    fn override_flags_map_into_partial_settings() {
        let cli = Cli::try_parse_from([
            "repo-mirror",
            "--source-url",
            "https://example.com/a.git",
            "--target-branch",
            "release",
            "--sync-interval",
            "60",
            "sync",
        ])
        .unwrap();

        let partial = cli.overrides.into_partial();
        assert_eq!(
            partial.source.url.as_deref(),
            Some("https://example.com/a.git")
        );
        assert_eq!(partial.target.branch.as_deref(), Some("release"));
        assert_eq!(partial.sync_interval, Some(60));
        assert!(partial.local_path.is_none());
    }
}
