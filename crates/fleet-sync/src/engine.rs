use indicatif::{ProgressBar, ProgressStyle};

use fleet_core::models::status::RepositoryStatus;
use fleet_core::models::sync::{SyncOutcome, SyncReport};

use crate::backend::GitBackend;
use crate::executor::sync_repository;

/// Runs syncs one repository at a time. A failure in one repository is
/// recorded in its report and the batch moves on.
pub struct SyncEngine<'a> {
    git: &'a dyn GitBackend,
    show_progress: bool,
}

impl<'a> SyncEngine<'a> {
    pub fn new(git: &'a dyn GitBackend) -> Self {
        Self {
            git,
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Sync every repository in order with the same commit message.
    pub fn sync_all(&self, statuses: &[RepositoryStatus], message: &str) -> Vec<SyncReport> {
        let pb = if self.show_progress {
            ProgressBar::new(statuses.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{pos}/{len}] {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }

        let mut reports = Vec::with_capacity(statuses.len());
        for status in statuses {
            pb.set_message(format!("syncing {}", status.name));
            let report = sync_repository(self.git, status, message);
            pb.inc(1);
            reports.push(report);
        }
        pb.finish_and_clear();

        let summary = BatchSummary::from_reports(&reports);
        tracing::info!(
            "batch sync: {} synced | {} clean | {} failed",
            summary.synced,
            summary.clean,
            summary.failed
        );
        reports
    }
}

/// Counts of batch outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub synced: usize,
    pub clean: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_reports(reports: &[SyncReport]) -> Self {
        let mut summary = Self::default();
        for report in reports {
            match report.outcome {
                SyncOutcome::Synced => summary.synced += 1,
                SyncOutcome::AlreadyClean => summary.clean += 1,
                SyncOutcome::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }
}
