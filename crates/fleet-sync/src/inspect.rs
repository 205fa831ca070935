use std::path::Path;

use fleet_core::models::status::{FetchOutcome, RepositoryStatus, Upstream, DETACHED};

use crate::backend::GitBackend;

/// Build the status record for one repository.
///
/// Returns `None` when `path` is not a usable repository (e.g. corrupt
/// metadata); callers drop it from the listing. Every other step is
/// independent: a failing step leaves its field at the clean default.
pub fn inspect(git: &dyn GitBackend, path: &Path) -> Option<RepositoryStatus> {
    if !git.is_repository(path) {
        tracing::debug!("{}: not a readable repository, skipping", path.display());
        return None;
    }

    let mut status = RepositoryStatus::new(path.to_path_buf());

    // 1. Branch
    let branch = match git.current_branch(path) {
        Ok(b) => b,
        Err(e) => {
            tracing::debug!("{}: could not resolve HEAD: {e}", status.name);
            None
        }
    };
    status.branch = branch.clone().unwrap_or_else(|| DETACHED.to_string());

    // 2. Dirty
    match git.changes(path) {
        Ok(changes) => status.dirty = !changes.is_empty(),
        Err(e) => tracing::warn!("{}: status check failed: {e}", status.name),
    }

    // 3. Fetch (best effort)
    let remote = branch
        .as_deref()
        .and_then(|b| git.branch_remote(path, b).ok().flatten())
        .unwrap_or_else(|| "origin".to_string());
    status.fetch = fetch_best_effort(git, path, &status.name, &remote);

    // 4. Ahead/behind against the upstream
    if let Some(local) = branch {
        if let Ok(Some(upstream)) = git.upstream(path) {
            status.behind = count(git, path, &local, &upstream, &status.name);
            status.ahead = count(git, path, &upstream, &local, &status.name);
            status.upstream = Some(Upstream {
                remote,
                branch: upstream,
            });
        }
    }

    tracing::debug!(
        "{}: branch={} dirty={} ahead={} behind={} tracking={}",
        status.name,
        status.branch,
        status.dirty,
        status.ahead,
        status.behind,
        status.tracking_state()
    );
    Some(status)
}

/// Fetch `remote`; failures are recorded, never raised. Stale refs are
/// acceptable for the ahead/behind counts that follow.
fn fetch_best_effort(
    git: &dyn GitBackend,
    path: &Path,
    name: &str,
    remote: &str,
) -> FetchOutcome {
    match git.remotes(path) {
        Ok(remotes) if remotes.is_empty() => return FetchOutcome::NoRemote,
        Ok(_) => {}
        Err(e) => return FetchOutcome::Failed(e.to_string()),
    }
    match git.fetch(path, remote) {
        Ok(()) => FetchOutcome::Fetched,
        Err(e) => {
            tracing::warn!("{name}: fetch from {remote} failed, using cached refs: {e}");
            FetchOutcome::Failed(e.to_string())
        }
    }
}

fn count(git: &dyn GitBackend, path: &Path, a: &str, b: &str, name: &str) -> u32 {
    git.rev_list_count(path, a, b).unwrap_or_else(|e| {
        tracing::debug!("{name}: rev-list {a}..{b} failed: {e}");
        0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryGit, MemoryRepo};
    use fleet_core::models::status::{ChangeKind, FileChange, TrackingState};
    use std::path::PathBuf;

    fn untracked(path: &str) -> FileChange {
        FileChange {
            path: path.to_string(),
            kind: ChangeKind::Untracked,
        }
    }

    #[test]
    fn test_untracked_files_make_dirty() {
        let git = MemoryGit::new();
        let path = PathBuf::from("/fleet/notes");
        let mut repo = MemoryRepo::tracking("main");
        repo.changes = vec![untracked("a.txt"), untracked("b.txt")];
        git.insert(&path, repo);

        let status = inspect(&git, &path).unwrap();
        assert!(status.dirty);
        assert_eq!(status.ahead, 0);
        assert_eq!(status.behind, 0);
        assert_eq!(status.branch, "main");
        assert_eq!(status.fetch, FetchOutcome::Fetched);
        assert_eq!(status.tracking_state(), TrackingState::Synced);
    }

    #[test]
    fn test_behind_counts() {
        let git = MemoryGit::new();
        let path = PathBuf::from("/fleet/site");
        let mut repo = MemoryRepo::tracking("main");
        repo.behind = 3;
        git.insert(&path, repo);

        let status = inspect(&git, &path).unwrap();
        assert!(!status.dirty);
        assert_eq!(status.ahead, 0);
        assert_eq!(status.behind, 3);
        assert_eq!(
            status.upstream,
            Some(Upstream {
                remote: "origin".to_string(),
                branch: "origin/main".to_string(),
            })
        );
    }

    #[test]
    fn test_dirty_ahead_and_behind_together() {
        let git = MemoryGit::new();
        let path = PathBuf::from("/fleet/all");
        let mut repo = MemoryRepo::tracking("dev");
        repo.changes = vec![untracked("x")];
        repo.ahead = 2;
        repo.behind = 4;
        git.insert(&path, repo);

        let status = inspect(&git, &path).unwrap();
        assert!(status.dirty);
        assert_eq!((status.ahead, status.behind), (2, 4));
        assert_eq!(status.tracking_state(), TrackingState::Diverged);
    }

    #[test]
    fn test_detached_head() {
        let git = MemoryGit::new();
        let path = PathBuf::from("/fleet/detached");
        let mut repo = MemoryRepo::tracking("main");
        repo.branch = None;
        repo.behind = 7;
        git.insert(&path, repo);

        let status = inspect(&git, &path).unwrap();
        assert_eq!(status.branch, "DETACHED");
        assert_eq!(status.behind, 0);
        assert!(status.upstream.is_none());
    }

    #[test]
    fn test_no_upstream_reports_zero() {
        let git = MemoryGit::new();
        let path = PathBuf::from("/fleet/local");
        let repo = MemoryRepo {
            branch: Some("main".to_string()),
            ..MemoryRepo::default()
        };
        git.insert(&path, repo);

        let status = inspect(&git, &path).unwrap();
        assert_eq!((status.ahead, status.behind), (0, 0));
        assert_eq!(status.fetch, FetchOutcome::NoRemote);
        assert_eq!(status.tracking_state(), TrackingState::NoRemoteTracking);
        assert!(!git.calls().iter().any(|c| c.starts_with("fetch")));
    }

    #[test]
    fn test_fetch_failure_is_not_fatal() {
        let git = MemoryGit::new();
        let path = PathBuf::from("/fleet/offline");
        let mut repo = MemoryRepo::tracking("main");
        repo.fail_fetch = true;
        repo.ahead = 1;
        git.insert(&path, repo);

        let status = inspect(&git, &path).unwrap();
        assert!(matches!(status.fetch, FetchOutcome::Failed(_)));
        assert_eq!(status.ahead, 1);
    }

    #[test]
    fn test_invalid_repository_yields_none() {
        let git = MemoryGit::new();
        assert!(inspect(&git, Path::new("/fleet/corrupt")).is_none());
    }
}
