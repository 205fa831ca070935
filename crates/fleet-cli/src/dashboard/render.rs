use comfy_table::{Cell, Color, Table};
use console::style;

use fleet_core::models::status::{
    ChangeKind, CommitSummary, FileChange, RepositoryStatus, TrackingState,
};
use fleet_core::models::sync::{SyncAction, SyncOutcome, SyncReport};

/// Icon, label and color for one row. Unsaved work wins over ahead, which
/// wins over behind.
pub fn status_label(status: &RepositoryStatus) -> (&'static str, String, Color) {
    if status.dirty {
        return ("⚠️", "Unsaved Work".to_string(), Color::Yellow);
    }
    match status.tracking_state() {
        TrackingState::Ahead | TrackingState::Diverged => {
            ("⬆️", format!("Ahead (+{})", status.ahead), Color::Blue)
        }
        TrackingState::Behind => ("⬇️", format!("Behind (-{})", status.behind), Color::Magenta),
        TrackingState::NoRemoteTracking => ("➖", "No upstream".to_string(), Color::White),
        TrackingState::Synced => ("✅", "Synced".to_string(), Color::Green),
    }
}

pub fn status_table(repos: &[RepositoryStatus]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "", "REPO", "BRANCH", "STATUS"]);

    for (idx, repo) in repos.iter().enumerate() {
        let (icon, label, color) = status_label(repo);
        table.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(icon),
            Cell::new(&repo.name),
            Cell::new(format!("[{}]", repo.branch)),
            Cell::new(label).fg(color),
        ]);
    }

    table
}

pub fn menu() -> Vec<String> {
    vec![
        String::new(),
        "-------------------------------------------".to_string(),
        " A. Sync ALL repositories".to_string(),
        " S. Setup Tools (Alias & .gitignore)".to_string(),
        " R. Refresh".to_string(),
        " Q. Quit".to_string(),
    ]
}

pub fn file_details(name: &str, changes: &[FileChange]) -> Vec<String> {
    let mut lines = vec![format!("\n   📄 File Status for [{name}]:")];
    for change in changes {
        lines.push(match change.kind {
            ChangeKind::Modified => format!("      ✏️  Modified: {}", change.path),
            ChangeKind::Untracked => format!("      🆕 New File: {}", change.path),
        });
    }
    lines
}

pub fn history(name: &str, commits: &[CommitSummary]) -> Vec<String> {
    let mut lines = vec![format!("\n   📜 History for {name}:")];
    for commit in commits {
        lines.push(format!(
            "      🔹 [{}] {} ({})",
            commit.committed_at.format("%Y-%m-%d %H:%M"),
            commit.summary,
            commit.author
        ));
    }
    lines
}

pub fn sync_report(report: &SyncReport) -> Vec<String> {
    let mut lines = vec![format!("   ⚙️  Processing: {}...", report.name)];
    if !report.changes.is_empty() {
        lines.extend(file_details(&report.name, &report.changes));
    }
    for action in &report.actions {
        lines.push(match action {
            SyncAction::Committed => "      ✅ Local changes saved.".to_string(),
            SyncAction::Pulled => "      ✅ Pulled down new changes.".to_string(),
            SyncAction::Pushed => "      ✅ Pushed up to remote.".to_string(),
        });
    }
    match &report.outcome {
        SyncOutcome::AlreadyClean => lines.push("      ✨ Already clean.".to_string()),
        SyncOutcome::Synced => {}
        SyncOutcome::Failed(msg) => {
            lines.push(format!("      {} {msg}", style("❌ Error syncing:").red()))
        }
    }
    lines
}
