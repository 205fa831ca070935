use chrono::{DateTime, Utc};

use super::status::{FileChange, RepositoryStatus};

/// Commit message used when syncing a single repository without input.
pub const DEFAULT_SINGLE_MESSAGE: &str = "Update via Fleet Commander";

/// Commit message used for every repository in a batch sync.
pub const DEFAULT_BATCH_MESSAGE: &str = "Auto-sync via Fleet Commander";

/// Use `input` as the commit message unless it is blank.
pub fn commit_message_or(input: &str, default: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Which operations a sync will perform, decided from a status alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncPlan {
    pub commit: bool,
    pub pull: bool,
    pub push: bool,
}

impl SyncPlan {
    pub fn for_status(status: &RepositoryStatus) -> Self {
        Self {
            commit: status.dirty,
            pull: status.behind > 0,
            push: status.dirty || status.ahead > 0,
        }
    }

    pub fn is_noop(&self) -> bool {
        !self.commit && !self.pull && !self.push
    }
}

/// An operation that completed during a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Committed,
    Pulled,
    Pushed,
}

impl std::fmt::Display for SyncAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncAction::Committed => write!(f, "committed"),
            SyncAction::Pulled => write!(f, "pulled"),
            SyncAction::Pushed => write!(f, "pushed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    AlreadyClean,
    Synced,
    /// The first failing step's message; later steps were not attempted.
    Failed(String),
}

impl std::fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncOutcome::AlreadyClean => write!(f, "already clean"),
            SyncOutcome::Synced => write!(f, "synced"),
            SyncOutcome::Failed(msg) => write!(f, "failed: {msg}"),
        }
    }
}

/// Record of one repository's sync.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub name: String,
    pub actions: Vec<SyncAction>,
    /// Files that were staged for the commit, if the repository was dirty.
    pub changes: Vec<FileChange>,
    pub outcome: SyncOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            actions: Vec::new(),
            changes: Vec::new(),
            outcome: SyncOutcome::Synced,
            started_at: now,
            finished_at: now,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, SyncOutcome::Failed(_))
    }
}
