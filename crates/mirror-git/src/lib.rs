//! Git transport layer for Repo Mirror
//!
//! Thin wrappers over git2 for the operations the mirroring engine needs
//! (clone, fetch, fast-forward, push, remote management), plus the
//! credential-resolution chain that authenticates them.

pub mod credentials;
pub mod error;
pub mod helper;
pub mod transport;

pub use credentials::{
    CredentialProvider, CredentialResult, ExplicitToken, HelperProcess, RemoteAuth, ResolverChain,
};
pub use error::{Error, Result};
pub use helper::HelperCommand;
pub use transport::{
    branch_tip, clone_branch, ensure_remote, fast_forward, fetch_branch, is_repository, open,
    push_branch, remote_tracking_tip,
};
