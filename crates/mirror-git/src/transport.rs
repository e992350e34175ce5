//! git2 wrappers for the mirroring engine
//!
//! Every operation that talks to a remote builds fresh credential callbacks,
//! so resolution happens per call rather than per process.

use std::path::Path;
use std::sync::Arc;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{BranchType, ErrorClass, ErrorCode, Oid, Repository};

use crate::credentials::{RemoteAuth, ResolverChain, fetch_options, push_options};
use crate::{Error, Result};

/// True iff `path` exists and git2 recognizes it as a well-formed repository.
pub fn is_repository(path: &Path) -> bool {
    path.exists() && Repository::open(path).is_ok()
}

/// Open an existing repository.
pub fn open(path: &Path) -> Result<Repository> {
    Ok(Repository::open(path)?)
}

/// Clone a single branch of `url` into `path`.
pub fn clone_branch(
    url: &str,
    branch: &str,
    path: &Path,
    auth: &RemoteAuth,
    chain: &Arc<ResolverChain>,
) -> Result<Repository> {
    tracing::info!(url, branch, path = %path.display(), "cloning");

    let mut builder = RepoBuilder::new();
    builder.branch(branch);
    builder.fetch_options(fetch_options(auth, chain));

    builder.clone(url, path).map_err(|source| Error::CloneFailed {
        url: url.to_string(),
        path: path.to_path_buf(),
        source,
    })
}

/// Ensure `name` points at `url`.
///
/// An existing remote with the same name is deleted and re-added rather than
/// updated in place, so stale refspec configuration cannot survive a URL
/// change. Idempotent.
pub fn ensure_remote(repo: &Repository, name: &str, url: &str) -> Result<()> {
    if let Ok(existing) = repo.find_remote(name) {
        tracing::debug!(
            remote = name,
            old_url = existing.url().unwrap_or("<non-utf8>"),
            new_url = url,
            "replacing remote"
        );
        drop(existing);
        repo.remote_delete(name)?;
    }
    repo.remote(name, url)?;
    Ok(())
}

/// Fetch `branch` from the named remote into its remote-tracking ref.
///
/// The refspec names both sides explicitly so the tracking ref is updated
/// regardless of what the remote has configured.
pub fn fetch_branch(
    repo: &Repository,
    remote_name: &str,
    branch: &str,
    auth: &RemoteAuth,
    chain: &Arc<ResolverChain>,
) -> Result<()> {
    let mut remote = repo
        .find_remote(remote_name)
        .map_err(|_| Error::RemoteNotFound {
            name: remote_name.to_string(),
        })?;

    let refspec = format!("+refs/heads/{branch}:refs/remotes/{remote_name}/{branch}");
    let mut opts = fetch_options(auth, chain);
    remote
        .fetch(&[&refspec], Some(&mut opts), None)
        .map_err(|source| Error::FetchFailed {
            remote: remote_name.to_string(),
            source,
        })
}

/// Tip commit of the local branch.
pub fn branch_tip(repo: &Repository, branch: &str) -> Result<Oid> {
    let branch_ref = repo
        .find_branch(branch, BranchType::Local)
        .map_err(|_| Error::BranchNotFound {
            name: branch.to_string(),
        })?;
    Ok(branch_ref.get().peel_to_commit()?.id())
}

/// Tip commit of the remote-tracking ref `refs/remotes/<remote>/<branch>`.
pub fn remote_tracking_tip(repo: &Repository, remote_name: &str, branch: &str) -> Result<Oid> {
    let name = format!("refs/remotes/{remote_name}/{branch}");
    let reference = repo
        .find_reference(&name)
        .map_err(|_| Error::ReferenceNotFound { name: name.clone() })?;
    Ok(reference.peel_to_commit()?.id())
}

/// Advance the local branch to `target` and force-checkout the result.
///
/// No merge analysis: the mirrored branch is only ever moved by this code
/// path and never diverges from its source.
pub fn fast_forward(repo: &Repository, branch: &str, target: Oid) -> Result<()> {
    let refname = format!("refs/heads/{branch}");
    let mut reference = repo
        .find_reference(&refname)
        .map_err(|_| Error::BranchNotFound {
            name: branch.to_string(),
        })?;

    reference.set_target(target, &format!("mirror: fast-forward to {target}"))?;
    repo.checkout_head(Some(CheckoutBuilder::default().force()))?;
    Ok(())
}

/// Push to the named remote.
///
/// Uses the remote's configured push refspecs when present; a freshly added
/// remote has none, so the push falls back to
/// `refs/heads/<source_branch>:refs/heads/<target_branch>`. That guarantees a
/// concrete refspec even against a bare, empty target.
pub fn push_branch(
    repo: &Repository,
    remote_name: &str,
    source_branch: &str,
    target_branch: &str,
    auth: &RemoteAuth,
    chain: &Arc<ResolverChain>,
) -> Result<()> {
    let mut remote = repo
        .find_remote(remote_name)
        .map_err(|_| Error::RemoteNotFound {
            name: remote_name.to_string(),
        })?;

    let configured = remote.push_refspecs()?;
    let refspecs: Vec<String> = if configured.is_empty() {
        vec![format!(
            "refs/heads/{source_branch}:refs/heads/{target_branch}"
        )]
    } else {
        configured.iter().flatten().map(str::to_string).collect()
    };

    tracing::debug!(remote = remote_name, ?refspecs, "pushing");

    let refspec_refs: Vec<&str> = refspecs.iter().map(String::as_str).collect();
    let mut opts = push_options(auth, chain);
    remote
        .push(&refspec_refs, Some(&mut opts))
        .map_err(|source| Error::PushFailed {
            remote: remote_name.to_string(),
            hint: push_failure_hint(&source),
            source,
        })
}

/// Map an opaque libgit2 push error to an operator-facing likely cause.
fn push_failure_hint(err: &git2::Error) -> String {
    let message = err.message().to_ascii_lowercase();

    if err.code() == ErrorCode::Auth
        || message.contains("401")
        || message.contains("403")
        || message.contains("authentication")
        || message.contains("permission")
        || message.contains("denied")
    {
        "authentication or permission denied by the target remote".to_string()
    } else if err.code() == ErrorCode::NotFound
        || message.contains("not found")
        || message.contains("does not appear to be a git repository")
        || message.contains("failed to resolve path")
    {
        "target remote or branch not found; check the target URL".to_string()
    } else if matches!(err.class(), ErrorClass::Net | ErrorClass::Http | ErrorClass::Ssh) {
        "network failure reaching the target remote".to_string()
    } else {
        "push rejected by the target remote".to_string()
    }
}
