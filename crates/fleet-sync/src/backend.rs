use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fleet_core::error::FleetError;
use fleet_core::models::status::{CommitSummary, FileChange};

use crate::git_ops;

/// The git operations Fleet needs, so inspection and sync can run against
/// something other than the real `git` binary.
pub trait GitBackend: Send + Sync {
    /// `dir` is the top level of a readable working tree.
    fn is_repository(&self, dir: &Path) -> bool;

    /// Current branch, `None` when HEAD is detached.
    fn current_branch(&self, dir: &Path) -> Result<Option<String>, FleetError>;

    /// Uncommitted changes, untracked files included.
    fn changes(&self, dir: &Path) -> Result<Vec<FileChange>, FleetError>;

    fn remotes(&self, dir: &Path) -> Result<Vec<String>, FleetError>;

    /// Remote configured for `branch`.
    fn branch_remote(&self, dir: &Path, branch: &str) -> Result<Option<String>, FleetError>;

    fn fetch(&self, dir: &Path, remote: &str) -> Result<(), FleetError>;

    /// Short name of the current branch's upstream, e.g. `origin/main`.
    fn upstream(&self, dir: &Path) -> Result<Option<String>, FleetError>;

    /// Commits reachable from `b` but not `a`.
    fn rev_list_count(&self, dir: &Path, a: &str, b: &str) -> Result<u32, FleetError>;

    fn add_all(&self, dir: &Path) -> Result<(), FleetError>;

    fn commit(&self, dir: &Path, message: &str) -> Result<(), FleetError>;

    fn pull(&self, dir: &Path, remote: &str, branch: &str) -> Result<(), FleetError>;

    fn push(&self, dir: &Path, remote: &str, branch: &str) -> Result<(), FleetError>;

    /// The most recent `limit` commits on HEAD.
    fn log(&self, dir: &Path, limit: usize) -> Result<Vec<CommitSummary>, FleetError>;
}

/// Backend that shells out to the `git` binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitCli;

impl GitCli {
    pub fn new() -> Self {
        Self
    }
}

impl GitBackend for GitCli {
    fn is_repository(&self, dir: &Path) -> bool {
        let toplevel = match git_ops::toplevel(dir) {
            Ok(Some(t)) => PathBuf::from(t),
            Ok(None) => return false,
            Err(e) => {
                tracing::debug!("{}: {e}", dir.display());
                return false;
            }
        };
        // A broken `.git` makes git resolve an enclosing repository instead.
        match (toplevel.canonicalize(), dir.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    fn current_branch(&self, dir: &Path) -> Result<Option<String>, FleetError> {
        git_ops::current_branch(dir)
    }

    fn changes(&self, dir: &Path) -> Result<Vec<FileChange>, FleetError> {
        git_ops::status(dir)
    }

    fn remotes(&self, dir: &Path) -> Result<Vec<String>, FleetError> {
        git_ops::remote_list(dir)
    }

    fn branch_remote(&self, dir: &Path, branch: &str) -> Result<Option<String>, FleetError> {
        git_ops::branch_remote(dir, branch)
    }

    fn fetch(&self, dir: &Path, remote: &str) -> Result<(), FleetError> {
        git_ops::fetch(dir, remote)
    }

    fn upstream(&self, dir: &Path) -> Result<Option<String>, FleetError> {
        git_ops::upstream(dir)
    }

    fn rev_list_count(&self, dir: &Path, a: &str, b: &str) -> Result<u32, FleetError> {
        git_ops::rev_list_count(dir, a, b)
    }

    fn add_all(&self, dir: &Path) -> Result<(), FleetError> {
        git_ops::add_all(dir)
    }

    fn commit(&self, dir: &Path, message: &str) -> Result<(), FleetError> {
        git_ops::commit(dir, message)
    }

    fn pull(&self, dir: &Path, remote: &str, branch: &str) -> Result<(), FleetError> {
        git_ops::pull(dir, remote, branch)
    }

    fn push(&self, dir: &Path, remote: &str, branch: &str) -> Result<(), FleetError> {
        git_ops::push(dir, remote, branch)
    }

    fn log(&self, dir: &Path, limit: usize) -> Result<Vec<CommitSummary>, FleetError> {
        git_ops::log(dir, limit)
    }
}

/// State of one repository held by [`MemoryGit`].
#[derive(Debug, Clone, Default)]
pub struct MemoryRepo {
    /// `None` means detached HEAD.
    pub branch: Option<String>,
    pub changes: Vec<FileChange>,
    pub remotes: Vec<String>,
    /// e.g. `origin/main`
    pub upstream: Option<String>,
    pub ahead: u32,
    pub behind: u32,
    pub history: Vec<CommitSummary>,
    pub fail_fetch: bool,
    pub fail_commit: bool,
    pub fail_pull: bool,
    pub fail_push: bool,
}

impl MemoryRepo {
    /// A repository on `main` tracking `origin/main`, in sync and clean.
    pub fn tracking(branch: &str) -> Self {
        Self {
            branch: Some(branch.to_string()),
            remotes: vec!["origin".to_string()],
            upstream: Some(format!("origin/{branch}")),
            ..Self::default()
        }
    }
}

/// In-memory git backend for testing. Records every mutating or network call.
pub struct MemoryGit {
    repos: Mutex<HashMap<PathBuf, MemoryRepo>>,
    calls: Mutex<Vec<String>>,
}

impl MemoryGit {
    pub fn new() -> Self {
        Self {
            repos: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn insert(&self, path: impl Into<PathBuf>, repo: MemoryRepo) {
        self.repos.lock().unwrap().insert(path.into(), repo);
    }

    /// Calls recorded so far, e.g. `"commit notes Update via Fleet Commander"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, dir: &Path, call: String) {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.calls.lock().unwrap().push(format!("{call} {name}").trim().to_string());
    }

    fn with_repo<T>(
        &self,
        dir: &Path,
        f: impl FnOnce(&mut MemoryRepo) -> Result<T, FleetError>,
    ) -> Result<T, FleetError> {
        let mut repos = self.repos.lock().unwrap();
        let repo = repos.get_mut(dir).ok_or_else(|| FleetError::NotARepository {
            path: dir.to_path_buf(),
        })?;
        f(repo)
    }
}

impl Default for MemoryGit {
    fn default() -> Self {
        Self::new()
    }
}

fn injected(op: &str) -> FleetError {
    FleetError::GitError {
        message: format!("{op} failed (injected)"),
    }
}

impl GitBackend for MemoryGit {
    fn is_repository(&self, dir: &Path) -> bool {
        self.repos.lock().unwrap().contains_key(dir)
    }

    fn current_branch(&self, dir: &Path) -> Result<Option<String>, FleetError> {
        self.with_repo(dir, |r| Ok(r.branch.clone()))
    }

    fn changes(&self, dir: &Path) -> Result<Vec<FileChange>, FleetError> {
        self.with_repo(dir, |r| Ok(r.changes.clone()))
    }

    fn remotes(&self, dir: &Path) -> Result<Vec<String>, FleetError> {
        self.with_repo(dir, |r| Ok(r.remotes.clone()))
    }

    fn branch_remote(&self, dir: &Path, _branch: &str) -> Result<Option<String>, FleetError> {
        self.with_repo(dir, |r| {
            Ok(r.upstream
                .as_ref()
                .and_then(|u| u.split('/').next())
                .map(str::to_string))
        })
    }

    fn fetch(&self, dir: &Path, remote: &str) -> Result<(), FleetError> {
        self.record(dir, format!("fetch {remote}"));
        self.with_repo(dir, |r| if r.fail_fetch { Err(injected("fetch")) } else { Ok(()) })
    }

    fn upstream(&self, dir: &Path) -> Result<Option<String>, FleetError> {
        self.with_repo(dir, |r| Ok(r.upstream.clone()))
    }

    fn rev_list_count(&self, dir: &Path, a: &str, _b: &str) -> Result<u32, FleetError> {
        self.with_repo(dir, |r| {
            if r.upstream.as_deref() == Some(a) {
                Ok(r.ahead)
            } else {
                Ok(r.behind)
            }
        })
    }

    fn add_all(&self, dir: &Path) -> Result<(), FleetError> {
        self.record(dir, "add".to_string());
        self.with_repo(dir, |_| Ok(()))
    }

    fn commit(&self, dir: &Path, message: &str) -> Result<(), FleetError> {
        self.record(dir, format!("commit [{message}]"));
        self.with_repo(dir, |r| {
            if r.fail_commit {
                return Err(injected("commit"));
            }
            r.changes.clear();
            r.ahead += 1;
            Ok(())
        })
    }

    fn pull(&self, dir: &Path, remote: &str, _branch: &str) -> Result<(), FleetError> {
        self.record(dir, format!("pull {remote}"));
        self.with_repo(dir, |r| {
            if r.fail_pull {
                return Err(injected("pull"));
            }
            r.behind = 0;
            Ok(())
        })
    }

    fn push(&self, dir: &Path, remote: &str, branch: &str) -> Result<(), FleetError> {
        self.record(dir, format!("push {remote} {branch}"));
        self.with_repo(dir, |r| {
            if r.fail_push {
                return Err(injected("push"));
            }
            r.ahead = 0;
            Ok(())
        })
    }

    fn log(&self, dir: &Path, limit: usize) -> Result<Vec<CommitSummary>, FleetError> {
        self.with_repo(dir, |r| Ok(r.history.iter().take(limit).cloned().collect()))
    }
}
