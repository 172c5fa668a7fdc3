//! Batch file operations: rename, move, delete.
//!
//! All operations are sequential by design. Batch variants attempt every
//! item exactly once, capture per-item failures into the result, and never
//! abort early; single-item variants surface plain filesystem errors.

pub mod subtitles;

pub use subtitles::{find_subtitles, plan_renames, subtitle_suffix, SubtitlePolicy};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A per-item failure inside a batch operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpError {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of a multi-item file operation.
///
/// `success_count + failed_count` always equals the number of items
/// submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResult {
    pub success_count: usize,
    pub failed_count: usize,
    pub errors: Vec<OpError>,
}

impl BatchResult {
    fn record_failure(&mut self, path: &Path, error: impl std::fmt::Display) {
        self.failed_count += 1;
        self.errors.push(OpError {
            path: path.to_path_buf(),
            error: error.to_string(),
        });
    }
}

/// Outcome of a batch delete, with parent-folder cleanup accounted
/// separately from file deletion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteResult {
    pub files: BatchResult,
    pub folders_deleted: usize,
    pub folder_errors: Vec<OpError>,
}

/// Rename a file, creating the destination directory if needed.
///
/// Fails if the source does not exist or the underlying rename fails
/// (permissions, cross-device). No retry.
pub fn rename_file(old_path: &Path, new_path: &Path) -> io::Result<()> {
    if let Some(parent) = new_path.parent() {
        fs::create_dir_all(parent)?;
    }

    if !old_path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("source does not exist: {}", old_path.display()),
        ));
    }

    fs::rename(old_path, new_path)
}

/// Rename a media file together with its subtitle satellites.
///
/// Satellites are discovered from the pre-rename directory state, then the
/// primary is renamed; a primary failure propagates. Each satellite rename
/// is attempted afterwards, and individual satellite failures are logged
/// and swallowed so one bad subtitle never aborts the operation. Returns
/// the new paths of the satellites that were renamed.
pub fn rename_with_subtitles(
    old_path: &Path,
    new_path: &Path,
    policy: SubtitlePolicy,
) -> io::Result<Vec<PathBuf>> {
    let satellites = find_subtitles(old_path, policy);
    let plan = plan_renames(new_path, &satellites);

    rename_file(old_path, new_path)?;

    let mut renamed = Vec::new();
    for (subtitle, target) in plan {
        match rename_file(&subtitle, &target) {
            Ok(()) => {
                debug!("Renamed subtitle {:?} -> {:?}", subtitle, target);
                renamed.push(target);
            }
            Err(e) => {
                warn!("Failed to rename subtitle {:?}: {}", subtitle, e);
            }
        }
    }

    Ok(renamed)
}

/// Move a file into `dest_dir`, keeping its filename. Returns the new path.
pub fn move_file(source_path: &Path, dest_dir: &Path) -> io::Result<PathBuf> {
    let filename = source_path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("path has no filename: {}", source_path.display()),
        )
    })?;

    let dest_path = dest_dir.join(filename);
    rename_file(source_path, &dest_path)?;
    Ok(dest_path)
}

/// Delete a file. Fails if it does not exist.
pub fn delete_file(path: &Path) -> io::Result<()> {
    if !path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("file does not exist: {}", path.display()),
        ));
    }
    fs::remove_file(path)
}

/// Delete a folder. Non-recursive; fails if the folder is not empty.
pub fn delete_folder(path: &Path) -> io::Result<()> {
    fs::remove_dir(path)
}

/// Rename a folder, creating the parent of the new path if needed.
pub fn rename_folder(old_path: &Path, new_path: &Path) -> io::Result<()> {
    if !old_path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("source does not exist: {}", old_path.display()),
        ));
    }

    if let Some(parent) = new_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::rename(old_path, new_path)
}

/// Rename every `(old, new)` pair, capturing per-item failures.
pub fn batch_rename(files: &[(PathBuf, PathBuf)]) -> BatchResult {
    let mut result = BatchResult::default();

    for (old_path, new_path) in files {
        match rename_file(old_path, new_path) {
            Ok(()) => result.success_count += 1,
            Err(e) => result.record_failure(old_path, e),
        }
    }

    result
}

/// Move every path into `dest_dir`, capturing per-item failures.
pub fn batch_move(source_paths: &[PathBuf], dest_dir: &Path) -> BatchResult {
    let mut result = BatchResult::default();

    // Best effort up front; per-item moves recreate it anyway
    if let Err(e) = fs::create_dir_all(dest_dir) {
        warn!("Failed to create destination {:?}: {}", dest_dir, e);
    }

    for source_path in source_paths {
        match move_file(source_path, dest_dir) {
            Ok(_) => result.success_count += 1,
            Err(e) => result.record_failure(source_path, e),
        }
    }

    result
}

/// Delete every path, capturing per-item failures.
///
/// With `delete_parent_folders`, the distinct parent directories of
/// successfully deleted files are removed afterwards (non-recursive);
/// failures there — typically a non-empty folder — are recorded in
/// `folder_errors` without affecting the file accounting.
pub fn batch_delete(file_paths: &[PathBuf], delete_parent_folders: bool) -> DeleteResult {
    let mut result = DeleteResult::default();
    let mut parent_folders: BTreeSet<PathBuf> = BTreeSet::new();

    for file_path in file_paths {
        match delete_file(file_path) {
            Ok(()) => {
                result.files.success_count += 1;
                if delete_parent_folders {
                    if let Some(parent) = file_path.parent() {
                        parent_folders.insert(parent.to_path_buf());
                    }
                }
            }
            Err(e) => result.files.record_failure(file_path, e),
        }
    }

    for folder_path in parent_folders {
        match delete_folder(&folder_path) {
            Ok(()) => result.folders_deleted += 1,
            Err(e) => {
                // Usually the folder still has other content
                result.folder_errors.push(OpError {
                    path: folder_path,
                    error: e.to_string(),
                });
            }
        }
    }

    result
}
