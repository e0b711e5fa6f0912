use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Directories with this name are archived sessions and never scanned.
pub const LEGACY_DIR_NAME: &str = "legacy";

const LOG_EXTENSION: &str = ".jsonl";

pub fn default_sessions_dir() -> PathBuf {
    if let Ok(path) = std::env::var("CODEX_SESSIONS_DIR")
        && !path.trim().is_empty()
    {
        return PathBuf::from(path);
    }
    if let Ok(path) = std::env::var("CODEX_HOME")
        && !path.trim().is_empty()
    {
        return PathBuf::from(path).join("sessions");
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".codex").join("sessions");
    }
    PathBuf::from(".codex").join("sessions")
}

fn is_log_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(LOG_EXTENSION))
}

/// Every `*.jsonl` file under `root`, skipping `legacy` subtrees, sorted.
/// A missing root yields nothing.
pub fn discover_log_files(root: &Path) -> Vec<PathBuf> {
    if !root.is_dir() {
        tracing::warn!(?root, "sessions root does not exist, skipping");
        return Vec::new();
    }
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !(entry.file_type().is_dir() && entry.file_name() == LEGACY_DIR_NAME)
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| !entry.file_type().is_dir() && is_log_path(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// Discovery across several roots, concatenated in root order.
pub fn discover_all(roots: &[PathBuf]) -> Vec<PathBuf> {
    roots
        .iter()
        .flat_map(|root| discover_log_files(root))
        .collect()
}
