//! Result file discovery

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Errors locating result files
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Results directory missing or not a directory
    #[error("results directory not found: {0}")]
    NotFound(PathBuf),

    /// Directory exists but holds no matching files
    #[error("no .{extension} files under {dir}")]
    NoFiles {
        /// Directory searched
        dir: PathBuf,
        /// Extension looked for
        extension: String,
    },

    /// Directory traversal failed
    #[error("failed to walk results directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Files under `dir` with the given extension, sorted by path.
///
/// Extension matching ignores case. Symlinks are not followed.
pub fn discover_result_files(
    dir: &Path,
    extension: &str,
    recursive: bool,
) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !dir.is_dir() {
        return Err(DiscoveryError::NotFound(dir.to_path_buf()));
    }

    let extension = extension.trim_start_matches('.');
    let max_depth = if recursive { usize::MAX } else { 1 };

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false).max_depth(max_depth) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if matches {
            files.push(entry.into_path());
        }
    }

    if files.is_empty() {
        return Err(DiscoveryError::NoFiles {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
        });
    }

    files.sort();
    tracing::debug!(dir = %dir.display(), count = files.len(), "discovered result files");
    Ok(files)
}

/// Run id for a result file: its name without extension
pub fn run_id_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
