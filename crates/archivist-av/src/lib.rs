//! # archivist-av
//!
//! Stream probing boundary for archivist.
//!
//! This crate wraps the external `ffprobe` tool: it spawns the process,
//! parses the JSON it prints, and maps the result into typed stream
//! metadata. Probe failures are surfaced as descriptive errors so callers
//! can record them per file without aborting a larger operation.
//!
//! ## Example
//!
//! ```no_run
//! use archivist_av::probe;
//! use std::path::Path;
//!
//! let info = probe(Path::new("/path/to/video.mkv"))?;
//! println!("Container: {}", info.container);
//! if let Some(video) = info.primary_video() {
//!     println!("Video: {} {}x{}", video.codec, video.width, video.height);
//! }
//! # Ok::<(), archivist_av::Error>(())
//! ```

mod error;
pub mod probe;
pub mod tools;

// Re-exports
pub use error::{Error, Result};
pub use probe::{
    probe, AudioChannelType, AudioStream, MediaInfo, ResolutionCategory, SubtitleStream,
    VideoStream,
};
pub use tools::{check_tool, check_tools, require_tool, ToolInfo};
