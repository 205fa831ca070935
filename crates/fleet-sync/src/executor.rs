use chrono::Utc;
use fleet_core::error::FleetError;
use fleet_core::models::status::RepositoryStatus;
use fleet_core::models::sync::{SyncAction, SyncOutcome, SyncPlan, SyncReport};

use crate::backend::GitBackend;

/// Reconcile one repository with its remote.
///
/// Flow:
/// 1. Dirty: stage everything and commit with `message`
/// 2. Behind: pull from the tracked remote
/// 3. Dirty (before step 1) or ahead: push to the tracked remote
/// 4. None of the above: report already clean, touch nothing
///
/// The first failing step ends this repository's sync; the error is
/// returned in the report rather than raised.
pub fn sync_repository(
    git: &dyn GitBackend,
    status: &RepositoryStatus,
    message: &str,
) -> SyncReport {
    let mut report = SyncReport::new(&status.name);
    let plan = SyncPlan::for_status(status);

    if plan.is_noop() {
        tracing::info!("{}: already clean", status.name);
        report.outcome = SyncOutcome::AlreadyClean;
        report.finished_at = Utc::now();
        return report;
    }

    if let Err(e) = run_plan(git, status, &plan, message, &mut report) {
        tracing::warn!("{}: sync failed: {e}", status.name);
        report.outcome = SyncOutcome::Failed(e.to_string());
    }

    report.finished_at = Utc::now();
    report
}

fn run_plan(
    git: &dyn GitBackend,
    status: &RepositoryStatus,
    plan: &SyncPlan,
    message: &str,
    report: &mut SyncReport,
) -> Result<(), FleetError> {
    let dir = status.path.as_path();
    let remote = status.remote();

    if plan.commit {
        match git.changes(dir) {
            Ok(changes) => report.changes = changes,
            Err(e) => tracing::debug!("{}: could not list changes: {e}", status.name),
        }
        git.add_all(dir)?;
        git.commit(dir, message)?;
        tracing::info!("{}: committed local changes", status.name);
        report.actions.push(SyncAction::Committed);
    }

    if plan.pull {
        git.pull(dir, remote, &status.branch)?;
        tracing::info!("{}: pulled from {remote}", status.name);
        report.actions.push(SyncAction::Pulled);
    }

    if plan.push {
        git.push(dir, remote, &status.branch)?;
        tracing::info!("{}: pushed to {remote}", status.name);
        report.actions.push(SyncAction::Pushed);
    }

    Ok(())
}
