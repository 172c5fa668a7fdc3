//! Path utilities for classifying files by extension.
//!
//! These functions decide what the scanner treats as a media file and what
//! the rename engine treats as a subtitle satellite. Classification is by
//! extension only; no filesystem access happens here.

use std::path::Path;

/// List of supported media file extensions.
const MEDIA_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "ts", "m2ts", "vob",
    "divx",
];

/// List of supported subtitle file extensions.
const SUBTITLE_EXTENSIONS: &[&str] = &["srt", "sub", "ass", "ssa", "vtt", "idx"];

/// Check if a path has a supported media file extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use archivist_common::paths::is_media_file;
///
/// assert!(is_media_file(Path::new("movie.mkv")));
/// assert!(is_media_file(Path::new("/path/to/video.MP4")));
/// assert!(!is_media_file(Path::new("subtitle.srt")));
/// ```
pub fn is_media_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MEDIA_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Check if a path has a subtitle file extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use archivist_common::paths::is_subtitle_file;
///
/// assert!(is_subtitle_file(Path::new("movie.en.srt")));
/// assert!(!is_subtitle_file(Path::new("movie.mkv")));
/// ```
pub fn is_subtitle_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUBTITLE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Get the list of supported media file extensions.
#[must_use]
pub fn media_extensions() -> &'static [&'static str] {
    MEDIA_EXTENSIONS
}

/// Get the list of subtitle file extensions.
#[must_use]
pub fn subtitle_extensions() -> &'static [&'static str] {
    SUBTITLE_EXTENSIONS
}
