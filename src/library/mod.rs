//! Media library model: scanned file records and the prior-scan snapshot
//! used for incremental rescans.

mod store;

pub use store::LibraryStore;

use archivist_av::{AudioStream, MediaInfo, SubtitleStream, VideoStream};
use archivist_common::MediaFileId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// One entry per scanned media file.
///
/// Created on first successful probe and replaced wholesale on reprobe;
/// `id` stays stable across rescans as long as the path string matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFileRecord {
    pub id: MediaFileId,
    pub path: PathBuf,
    pub filename: String,
    pub directory: PathBuf,
    /// Lowercased extension without the dot.
    pub extension: String,
    pub size_bytes: u64,
    /// Duration in seconds, fractional.
    pub duration_secs: Option<f64>,
    pub container: Option<String>,
    /// Overall bitrate in bits per second.
    pub bitrate: Option<u64>,
    pub video_streams: Vec<VideoStream>,
    pub audio_streams: Vec<AudioStream>,
    pub subtitle_streams: Vec<SubtitleStream>,
    /// Time of the last successful probe. Advances only on (re-)probe; a
    /// record reused from a prior snapshot keeps its original value.
    pub scanned_at: DateTime<Utc>,
}

impl MediaFileRecord {
    /// Build a record from raw probe output, stamping a fresh id and
    /// `scanned_at`.
    pub fn from_probe(info: MediaInfo) -> Self {
        let filename = info
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let directory = info
            .path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_default();
        let extension = info
            .path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        Self {
            id: MediaFileId::new(),
            path: info.path,
            filename,
            directory,
            extension,
            size_bytes: info.size_bytes,
            duration_secs: info.duration_secs,
            container: Some(info.container),
            bitrate: info.bitrate,
            video_streams: info.video_streams,
            audio_streams: info.audio_streams,
            subtitle_streams: info.subtitle_streams,
            scanned_at: Utc::now(),
        }
    }
}

/// The persisted library: all known records plus last-scan metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Library {
    #[serde(default)]
    pub files: Vec<MediaFileRecord>,
    #[serde(default)]
    pub last_scan_path: Option<PathBuf>,
    #[serde(default)]
    pub last_scan_at: Option<DateTime<Utc>>,
}

/// A prior-scan entry handed to the scanner for mtime diffing.
#[derive(Debug, Clone)]
pub struct SnapshotEntry {
    pub scanned_at: DateTime<Utc>,
    pub record: MediaFileRecord,
}

/// Prior scan results keyed by path. Read-only during a scan.
pub type Snapshot = HashMap<PathBuf, SnapshotEntry>;

impl Library {
    /// Build the path-keyed snapshot used for incremental rescans.
    pub fn snapshot(&self) -> Snapshot {
        self.files
            .iter()
            .map(|record| {
                (
                    record.path.clone(),
                    SnapshotEntry {
                        scanned_at: record.scanned_at,
                        record: record.clone(),
                    },
                )
            })
            .collect()
    }
}
