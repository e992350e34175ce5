//! Repository-level transport tests against local fixtures
//!
//! All remotes are plain filesystem paths, so no network or credentials are
//! involved.

use std::path::Path;
use std::sync::Arc;

use git2::{Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;

use mirror_git::{
    ExplicitToken, RemoteAuth, ResolverChain, branch_tip, clone_branch, ensure_remote,
    fast_forward, fetch_branch, is_repository, push_branch, remote_tracking_tip,
};

fn init_repo(path: &Path) -> Repository {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    Repository::init_opts(path, &opts).unwrap()
}

fn commit_file(repo: &Repository, name: &str, content: &str, message: &str) -> git2::Oid {
    let workdir = repo.workdir().unwrap();
    std::fs::write(workdir.join(name), content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(name)).unwrap();
    index.write().unwrap();

    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = Signature::now("Mirror Tests", "mirror@example.com").unwrap();

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

fn chain() -> Arc<ResolverChain> {
    // Local-path fixtures never invoke the credentials callback; keep the
    // chain to the deterministic tier so tests cannot shell out.
    Arc::new(ResolverChain::from_providers(vec![Box::new(ExplicitToken)]))
}

#[test]
fn is_repository_rejects_plain_directories() {
    let dir = TempDir::new().unwrap();
    assert!(!is_repository(dir.path()));
    assert!(!is_repository(&dir.path().join("missing")));

    init_repo(&dir.path().join("repo"));
    assert!(is_repository(&dir.path().join("repo")));
}

#[test]
fn clone_branch_clones_the_requested_branch() {
    let dir = TempDir::new().unwrap();
    let source = init_repo(&dir.path().join("source"));
    let tip = commit_file(&source, "readme.txt", "hello", "initial");

    let work = dir.path().join("work");
    let cloned = clone_branch(
        dir.path().join("source").to_str().unwrap(),
        "main",
        &work,
        &RemoteAuth::default(),
        &chain(),
    )
    .unwrap();

    assert_eq!(branch_tip(&cloned, "main").unwrap(), tip);
    assert!(work.join("readme.txt").exists());
}

#[test]
fn ensure_remote_adds_then_replaces() {
    let dir = TempDir::new().unwrap();
    let repo = init_repo(dir.path());

    ensure_remote(&repo, "origin", "https://example.com/a.git").unwrap();
    assert_eq!(
        repo.find_remote("origin").unwrap().url(),
        Some("https://example.com/a.git")
    );

    ensure_remote(&repo, "origin", "https://example.com/b.git").unwrap();
    assert_eq!(
        repo.find_remote("origin").unwrap().url(),
        Some("https://example.com/b.git")
    );

    let names = repo.remotes().unwrap();
    let origins = names.iter().flatten().filter(|n| *n == "origin").count();
    assert_eq!(origins, 1);
}

#[test]
fn fetch_compare_and_fast_forward_advance_the_branch() {
    let dir = TempDir::new().unwrap();
    let source = init_repo(&dir.path().join("source"));
    let first = commit_file(&source, "a.txt", "one", "first");

    let work_path = dir.path().join("work");
    let work = clone_branch(
        dir.path().join("source").to_str().unwrap(),
        "main",
        &work_path,
        &RemoteAuth::default(),
        &chain(),
    )
    .unwrap();

    let second = commit_file(&source, "a.txt", "two", "second");

    ensure_remote(&work, "source", dir.path().join("source").to_str().unwrap()).unwrap();
    fetch_branch(&work, "source", "main", &RemoteAuth::default(), &chain()).unwrap();

    assert_eq!(branch_tip(&work, "main").unwrap(), first);
    assert_eq!(remote_tracking_tip(&work, "source", "main").unwrap(), second);

    fast_forward(&work, "main", second).unwrap();

    assert_eq!(branch_tip(&work, "main").unwrap(), second);
    assert_eq!(
        std::fs::read_to_string(work_path.join("a.txt")).unwrap(),
        "two"
    );
}

#[test]
fn push_falls_back_to_branch_refspec_against_bare_target() {
    let dir = TempDir::new().unwrap();
    let source = init_repo(&dir.path().join("source"));
    let tip = commit_file(&source, "a.txt", "one", "first");

    let work = clone_branch(
        dir.path().join("source").to_str().unwrap(),
        "main",
        &dir.path().join("work"),
        &RemoteAuth::default(),
        &chain(),
    )
    .unwrap();

    let target_path = dir.path().join("target.git");
    Repository::init_bare(&target_path).unwrap();

    ensure_remote(&work, "origin", target_path.to_str().unwrap()).unwrap();
    push_branch(
        &work,
        "origin",
        "main",
        "main",
        &RemoteAuth::default(),
        &chain(),
    )
    .unwrap();

    let target = Repository::open_bare(&target_path).unwrap();
    let pushed = target
        .find_reference("refs/heads/main")
        .unwrap()
        .peel_to_commit()
        .unwrap()
        .id();
    assert_eq!(pushed, tip);
}

#[test]
fn push_to_unknown_remote_name_fails() {
    let dir = TempDir::new().unwrap();
    let repo = init_repo(dir.path());
    commit_file(&repo, "a.txt", "one", "first");

    let err = push_branch(
        &repo,
        "origin",
        "main",
        "main",
        &RemoteAuth::default(),
        &chain(),
    )
    .unwrap_err();

    assert!(matches!(err, mirror_git::Error::RemoteNotFound { .. }));
}
