//! Media file probing module.
//!
//! Extracts container and stream metadata by invoking the ffprobe
//! command-line tool and parsing its JSON output.

mod ffprobe;
mod types;

pub use ffprobe::probe_with_ffprobe;
pub use types::*;

use crate::{Error, Result};
use std::path::Path;

/// Probe a media file.
///
/// Verifies the file exists, then delegates to ffprobe.
pub fn probe(path: &Path) -> Result<MediaInfo> {
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }
    probe_with_ffprobe(path)
}
