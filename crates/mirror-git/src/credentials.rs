//! Credential resolution for remote operations
//!
//! Authentication material is resolved through a chain of providers, first
//! match wins: explicit token from configuration, then the system credential
//! helper, then whatever ambient mechanism the transport supports (SSH agent,
//! default credentials). Resolution runs fresh for every Git operation —
//! tokens may be single-use and helpers may rotate credentials between calls,
//! so nothing is cached.

use std::sync::Arc;

use git2::{Cred, CredentialType, FetchOptions, PushOptions, RemoteCallbacks};

use crate::helper::HelperCommand;

/// Authentication material configured for a remote endpoint.
#[derive(Debug, Clone, Default)]
pub struct RemoteAuth {
    pub username: Option<String>,
    pub token: Option<String>,
}

/// A resolved username/secret pair.
#[derive(Clone)]
pub struct CredentialResult {
    pub username: String,
    pub secret: String,
}

impl std::fmt::Debug for CredentialResult {
    // The secret must not end up in logs.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResult")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// A source of credentials for a remote URL.
///
/// Implementations may read configuration, shell out to a helper, or call a
/// platform credential store. Returning `None` means "no match here" and the
/// chain moves on; it is never an error.
pub trait CredentialProvider: Send + Sync {
    fn resolve(&self, auth: &RemoteAuth, url: &str) -> Option<CredentialResult>;
}

/// Tier 1: explicit token from configuration. Deterministic, no I/O.
pub struct ExplicitToken;

impl CredentialProvider for ExplicitToken {
    fn resolve(&self, auth: &RemoteAuth, _url: &str) -> Option<CredentialResult> {
        let token = auth.token.as_deref().filter(|t| !t.is_empty())?;
        let username = auth
            .username
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(token);
        Some(CredentialResult {
            username: username.to_string(),
            secret: token.to_string(),
        })
    }
}

/// Tier 2: the system credential helper subprocess.
#[derive(Default)]
pub struct HelperProcess {
    command: HelperCommand,
}

impl HelperProcess {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific helper invocation instead of `git credential fill`.
    pub fn with_command(command: HelperCommand) -> Self {
        Self { command }
    }
}

impl CredentialProvider for HelperProcess {
    fn resolve(&self, _auth: &RemoteAuth, url: &str) -> Option<CredentialResult> {
        self.command.fill(url)
    }
}

/// An ordered chain of credential providers.
pub struct ResolverChain {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl ResolverChain {
    /// The standard chain: explicit token, then the credential helper.
    ///
    /// The ambient tier (SSH agent, default credentials) lives in the git2
    /// callback itself because it produces `Cred` values directly rather
    /// than a username/secret pair.
    pub fn standard() -> Self {
        Self {
            providers: vec![Box::new(ExplicitToken), Box::new(HelperProcess::new())],
        }
    }

    /// Build a chain from explicit providers.
    pub fn from_providers(providers: Vec<Box<dyn CredentialProvider>>) -> Self {
        Self { providers }
    }

    /// Try each provider in order; first match wins.
    pub fn resolve(&self, auth: &RemoteAuth, url: &str) -> Option<CredentialResult> {
        self.providers.iter().find_map(|p| p.resolve(auth, url))
    }
}

/// Remote callbacks with credential and progress support.
///
/// Each call builds fresh callbacks, so every clone/fetch/push re-runs the
/// resolution chain. Tried-flags keep libgit2's retry loop from spinning on
/// a credential it has already rejected.
pub fn remote_callbacks(auth: &RemoteAuth, chain: &Arc<ResolverChain>) -> RemoteCallbacks<'static> {
    let auth = auth.clone();
    let chain = Arc::clone(chain);
    let mut tried_chain = false;
    let mut tried_agent = false;

    let mut callbacks = RemoteCallbacks::new();

    callbacks.credentials(move |url, username_from_url, allowed_types| {
        tracing::debug!(url, ?allowed_types, "credential callback");

        if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) && !tried_chain {
            tried_chain = true;
            if let Some(found) = chain.resolve(&auth, url) {
                tracing::debug!(username = %found.username, "resolved credentials for remote");
                return Cred::userpass_plaintext(&found.username, &found.secret);
            }
        }

        if allowed_types.contains(CredentialType::SSH_KEY) && !tried_agent {
            tried_agent = true;
            let username = username_from_url.unwrap_or("git");
            if let Ok(cred) = Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }
        }

        if allowed_types.contains(CredentialType::DEFAULT) {
            return Cred::default();
        }

        Err(git2::Error::from_str("no usable credentials for remote"))
    });

    callbacks.transfer_progress(|stats| {
        let received = stats.received_objects();
        let total = stats.total_objects();
        if total > 0 {
            tracing::debug!(
                received,
                total,
                bytes = stats.received_bytes(),
                "transfer progress"
            );
        }
        true
    });

    callbacks.sideband_progress(|data| {
        if let Ok(msg) = std::str::from_utf8(data) {
            let msg = msg.trim();
            if !msg.is_empty() {
                tracing::info!("remote: {msg}");
            }
        }
        true
    });

    callbacks.push_transfer_progress(|current, total, bytes| {
        if total > 0 {
            tracing::debug!(current, total, bytes, "push progress");
        }
    });

    callbacks
}

/// Fetch options carrying the credential callbacks.
pub fn fetch_options(auth: &RemoteAuth, chain: &Arc<ResolverChain>) -> FetchOptions<'static> {
    let mut opts = FetchOptions::new();
    opts.remote_callbacks(remote_callbacks(auth, chain));
    opts
}

/// Push options carrying the credential callbacks.
pub fn push_options(auth: &RemoteAuth, chain: &Arc<ResolverChain>) -> PushOptions<'static> {
    let mut opts = PushOptions::new();
    opts.remote_callbacks(remote_callbacks(auth, chain));
    opts
}
