use chrono::{DateTime, Local};
use std::path::PathBuf;

/// Branch name reported when HEAD is not on a named branch.
pub const DETACHED: &str = "DETACHED";

/// The remote branch a local branch compares against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    pub remote: String,
    /// Short name of the remote-tracking ref, e.g. `origin/main`.
    pub branch: String,
}

/// Result of the best-effort fetch performed during inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched,
    /// The repository has no remote to fetch from.
    NoRemote,
    /// Fetch failed; ahead/behind were computed from stale refs.
    Failed(String),
}

/// Relationship between a local branch and its upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    NoRemoteTracking,
    Synced,
    Ahead,
    Behind,
    Diverged,
}

impl std::fmt::Display for TrackingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackingState::NoRemoteTracking => write!(f, "no_remote_tracking"),
            TrackingState::Synced => write!(f, "synced"),
            TrackingState::Ahead => write!(f, "ahead"),
            TrackingState::Behind => write!(f, "behind"),
            TrackingState::Diverged => write!(f, "diverged"),
        }
    }
}

/// Snapshot of one local repository, rebuilt on every scan.
///
/// `dirty`, `ahead` and `behind` are independent: any combination can occur.
/// Without an upstream both counts stay zero, same as a fully synced branch;
/// use [`RepositoryStatus::tracking_state`] to tell the two apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryStatus {
    pub path: PathBuf,
    pub name: String,
    pub branch: String,
    pub dirty: bool,
    pub ahead: u32,
    pub behind: u32,
    pub upstream: Option<Upstream>,
    pub fetch: FetchOutcome,
}

impl RepositoryStatus {
    /// A clean, untracked status for `path`; the inspector fills in the rest.
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path,
            name,
            branch: DETACHED.to_string(),
            dirty: false,
            ahead: 0,
            behind: 0,
            upstream: None,
            fetch: FetchOutcome::NoRemote,
        }
    }

    pub fn is_detached(&self) -> bool {
        self.branch == DETACHED
    }

    /// Remote used for pull and push: the upstream's remote, else `origin`.
    pub fn remote(&self) -> &str {
        self.upstream
            .as_ref()
            .map(|u| u.remote.as_str())
            .unwrap_or("origin")
    }

    pub fn tracking_state(&self) -> TrackingState {
        if self.upstream.is_none() {
            return TrackingState::NoRemoteTracking;
        }
        match (self.ahead > 0, self.behind > 0) {
            (false, false) => TrackingState::Synced,
            (true, false) => TrackingState::Ahead,
            (false, true) => TrackingState::Behind,
            (true, true) => TrackingState::Diverged,
        }
    }

    /// Nothing to commit, pull or push.
    pub fn is_clean(&self) -> bool {
        !self.dirty && self.ahead == 0 && self.behind == 0
    }
}

/// Kind of uncommitted change in a working tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Modified,
    Untracked,
}

/// One uncommitted path, as reported by `git status --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub kind: ChangeKind,
}

impl FileChange {
    /// Parse one record of `git status --porcelain -z` output (`XY path`).
    pub fn from_porcelain(record: &str) -> Option<Self> {
        if record.len() < 4 || !record.is_char_boundary(3) {
            return None;
        }
        let (code, path) = record.split_at(3);
        let kind = if code.starts_with("??") {
            ChangeKind::Untracked
        } else {
            ChangeKind::Modified
        };
        Some(Self {
            path: path.to_string(),
            kind,
        })
    }

    /// Parse full `git status --porcelain -z` output. Paths are unquoted
    /// and unescaped; renames and copies carry the source path as an extra
    /// NUL-separated field, which is skipped.
    pub fn parse_porcelain_z(output: &str) -> Vec<Self> {
        let mut changes = Vec::new();
        let mut fields = output.split('\0');
        while let Some(record) = fields.next() {
            let xy = record.get(..2).unwrap_or("");
            if xy.contains(['R', 'C']) {
                fields.next();
            }
            if let Some(change) = Self::from_porcelain(record) {
                changes.push(change);
            }
        }
        changes
    }
}

/// One entry of the history view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub committed_at: DateTime<Local>,
    pub summary: String,
    pub author: String,
}
