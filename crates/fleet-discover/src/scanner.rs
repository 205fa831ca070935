use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use fleet_core::error::FleetError;

/// Directory that marks a git working tree.
const GIT_DIR: &str = ".git";

/// List the immediate subdirectories of `root` that contain a `.git`
/// directory, sorted alphabetically by folder name.
///
/// Only one level is inspected; nested repositories are not discovered.
/// Symlinked subdirectories count when their target is a repository.
pub fn locate_repositories(root: &Path) -> Result<Vec<PathBuf>, FleetError> {
    if !root.is_dir() {
        return Err(FleetError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    let mut repos = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!("skipping unreadable entry under {}: {e}", root.display());
                continue;
            }
        };
        // `Path::is_dir` follows symlinks; the walk itself does not.
        if !entry.path().is_dir() {
            continue;
        }
        if entry.path().join(GIT_DIR).is_dir() {
            repos.push(entry.into_path());
        }
    }

    tracing::debug!("found {} candidate repos in {}", repos.len(), root.display());
    Ok(repos)
}
