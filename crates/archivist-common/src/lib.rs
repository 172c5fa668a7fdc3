//! Archivist-Common: shared IDs and path utilities.
//!
//! This crate provides the small pieces used across archivist:
//!
//! - **Typed IDs**: a type-safe UUID wrapper for media file records
//! - **Path Utilities**: functions to classify files by extension
//!
//! # Examples
//!
//! ```
//! use archivist_common::MediaFileId;
//! use archivist_common::paths::{is_media_file, is_subtitle_file};
//! use std::path::Path;
//!
//! let id = MediaFileId::new();
//! assert_ne!(id, MediaFileId::new());
//!
//! assert!(is_media_file(Path::new("movie.mkv")));
//! assert!(is_subtitle_file(Path::new("movie.en.srt")));
//! ```

pub mod ids;
pub mod paths;

pub use ids::MediaFileId;
