use std::path::Path;
use std::process::Command;

use chrono::{DateTime, Local};
use fleet_core::error::FleetError;
use fleet_core::models::status::{CommitSummary, FileChange};

/// Result of a git command execution.
#[derive(Debug)]
pub struct GitOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

/// Run a git command in the given directory.
///
/// Credential prompts are disabled so a fetch against an unreachable or
/// private remote fails instead of blocking the dashboard.
fn git(dir: &Path, args: &[&str]) -> Result<GitOutput, FleetError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .map_err(|e| FleetError::GitError {
            message: format!("failed to run git {}: {e}", args.join(" ")),
        })?;

    Ok(GitOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        success: output.status.success(),
    })
}

/// Run a git command in the given directory, returning an error if it fails.
fn git_ok(dir: &Path, args: &[&str]) -> Result<String, FleetError> {
    let out = git(dir, args)?;
    if !out.success {
        return Err(FleetError::GitError {
            message: format!("git {} failed: {}", args.join(" "), out.stderr.trim()),
        });
    }
    Ok(out.stdout)
}

/// Top level of the working tree containing `dir`, if any.
pub fn toplevel(dir: &Path) -> Result<Option<String>, FleetError> {
    let out = git(dir, &["rev-parse", "--show-toplevel"])?;
    if out.success {
        Ok(Some(out.stdout.trim().to_string()))
    } else {
        Ok(None)
    }
}

/// Current branch name, or `None` when HEAD is detached.
pub fn current_branch(dir: &Path) -> Result<Option<String>, FleetError> {
    let out = git(dir, &["symbolic-ref", "--short", "-q", "HEAD"])?;
    if out.success {
        Ok(Some(out.stdout.trim().to_string()))
    } else {
        Ok(None)
    }
}

/// Uncommitted changes, untracked files included.
pub fn status(dir: &Path) -> Result<Vec<FileChange>, FleetError> {
    let stdout = git_ok(dir, &["status", "--porcelain", "-z", "--untracked-files=normal"])?;
    Ok(FileChange::parse_porcelain_z(&stdout))
}

/// List remotes.
pub fn remote_list(dir: &Path) -> Result<Vec<String>, FleetError> {
    let stdout = git_ok(dir, &["remote"])?;
    Ok(stdout
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect())
}

/// Remote configured for `branch` (`branch.<name>.remote`).
pub fn branch_remote(dir: &Path, branch: &str) -> Result<Option<String>, FleetError> {
    let key = format!("branch.{branch}.remote");
    let out = git(dir, &["config", "--get", &key])?;
    if out.success {
        Ok(Some(out.stdout.trim().to_string()))
    } else {
        Ok(None)
    }
}

/// Short name of the current branch's upstream, e.g. `origin/main`.
pub fn upstream(dir: &Path) -> Result<Option<String>, FleetError> {
    let out = git(dir, &["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"])?;
    if out.success {
        Ok(Some(out.stdout.trim().to_string()))
    } else {
        Ok(None)
    }
}

/// Fetch a remote, pruning deleted branches.
pub fn fetch(dir: &Path, remote: &str) -> Result<(), FleetError> {
    git_ok(dir, &["fetch", remote, "--prune"])?;
    Ok(())
}

/// Count commits reachable from `b` but not from `a`: `git rev-list --count a..b`
pub fn rev_list_count(dir: &Path, a: &str, b: &str) -> Result<u32, FleetError> {
    let range = format!("{a}..{b}");
    let stdout = git_ok(dir, &["rev-list", "--count", &range])?;
    Ok(stdout.trim().parse().unwrap_or(0))
}

/// Stage everything, untracked files and deletions included.
pub fn add_all(dir: &Path) -> Result<(), FleetError> {
    git_ok(dir, &["add", "--all"])?;
    Ok(())
}

pub fn commit(dir: &Path, message: &str) -> Result<(), FleetError> {
    git_ok(dir, &["commit", "-m", message])?;
    Ok(())
}

/// Merge the upstream of `branch` from `remote`.
pub fn pull(dir: &Path, remote: &str, branch: &str) -> Result<(), FleetError> {
    let out = git(dir, &["pull", "--no-rebase", "--no-edit", remote])?;
    if !out.success {
        if out.stdout.contains("CONFLICT") {
            return Err(FleetError::MergeConflict {
                branch: branch.to_string(),
                message: out.stdout.trim().to_string(),
            });
        }
        return Err(FleetError::GitError {
            message: format!("git pull {remote} failed: {}", out.stderr.trim()),
        });
    }
    Ok(())
}

/// Push a branch to a remote.
pub fn push(dir: &Path, remote: &str, branch: &str) -> Result<(), FleetError> {
    git_ok(dir, &["push", remote, branch])?;
    Ok(())
}

/// Field separator for `git log --format`.
const SEP: char = '\u{1f}';

/// The most recent `limit` commits on HEAD.
pub fn log(dir: &Path, limit: usize) -> Result<Vec<CommitSummary>, FleetError> {
    let max = format!("--max-count={limit}");
    let stdout = git_ok(dir, &["log", &max, "--format=%ct%x1f%an%x1f%s", "HEAD"])?;
    Ok(stdout.lines().filter_map(parse_log_line).collect())
}

fn parse_log_line(line: &str) -> Option<CommitSummary> {
    let mut fields = line.splitn(3, SEP);
    let secs: i64 = fields.next()?.trim().parse().ok()?;
    let author = fields.next()?.to_string();
    let summary = fields.next().unwrap_or("").to_string();
    let committed_at = DateTime::from_timestamp(secs, 0)?.with_timezone(&Local);
    Some(CommitSummary {
        committed_at,
        summary,
        author,
    })
}
