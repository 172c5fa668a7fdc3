//! Directory enumeration for scans.

use archivist_common::paths::is_media_file;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use walkdir::{DirEntry, WalkDir};

/// Recursively collect media file paths under `root`.
///
/// Hidden directories are pruned. Unreadable entries (permission denied,
/// race-deleted) are skipped without stopping the rest of the walk. The
/// cancellation flag is polled between entries; once set, whatever has been
/// collected so far is returned.
pub fn find_media_files(root: &Path, cancel: &AtomicBool) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| !is_hidden_dir(e));

    for entry in walker {
        if cancel.load(Ordering::SeqCst) {
            break;
        }

        // Skip entries we can't read
        let Ok(entry) = entry else { continue };

        if entry.file_type().is_file() && is_media_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}
