//! Log discovery: `<root>/<agent>/sessions/*.jsonl`, filtered by mtime.

use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::config::{LOG_EXTENSION, SESSIONS_DIR};
use crate::error::ScanError;

/// List session logs modified at or after `cutoff`, sorted by path.
///
/// Only a failure to list `root` itself is an error. Unreadable agent or
/// sessions directories and unreadable metadata are skipped.
pub fn list_session_logs(root: &Path, cutoff: DateTime<Utc>) -> Result<Vec<PathBuf>, ScanError> {
    fs::read_dir(root).map_err(|source| ScanError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;

    let mut out = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .max_depth(3)
        .into_iter()
        .filter_entry(|e| e.depth() != 2 || e.file_name() == SESSIONS_DIR);
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                debug!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if entry.depth() != 3 || !entry.file_type().is_file() || !is_log_file(entry.path()) {
            continue;
        }
        let modified = match entry.metadata().ok().and_then(|m| m.modified().ok()) {
            Some(t) => DateTime::<Utc>::from(t),
            None => continue,
        };
        if modified < cutoff {
            continue;
        }
        out.push(entry.into_path());
    }
    out.sort();
    Ok(out)
}

fn is_log_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == LOG_EXTENSION)
}
