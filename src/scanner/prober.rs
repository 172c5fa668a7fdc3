//! Probe seam for the scanner.
//!
//! The scheduler talks to probing through the [`StreamProbe`] trait so
//! tests can inject stubs; the production implementation shells out to
//! ffprobe via archivist-av.

use anyhow::Result;
use archivist_av::MediaInfo;
use async_trait::async_trait;
use std::path::Path;

/// Given an absolute file path, return stream metadata or fail.
#[async_trait]
pub trait StreamProbe: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<MediaInfo>;
}

/// Production prober backed by the external ffprobe tool.
pub struct FfprobeProber;

impl FfprobeProber {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StreamProbe for FfprobeProber {
    async fn probe(&self, path: &Path) -> Result<MediaInfo> {
        let path = path.to_path_buf();
        // ffprobe is a blocking subprocess; keep it off the async workers
        let info = tokio::task::spawn_blocking(move || archivist_av::probe(&path)).await??;
        Ok(info)
    }
}
