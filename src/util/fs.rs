//! Filesystem utilities.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Whether a file name is hidden (dot-prefixed).
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// List the candidate files in `dir`: regular, non-hidden files whose
/// extension is exactly `extension`. Not recursive; sorted by file name.
///
/// A directory that does not exist or cannot be read has no candidates.
pub fn candidate_files(dir: &Path, extension: &str) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| !is_hidden(path))
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some(extension))
        .collect()
}
