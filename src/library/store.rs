//! JSON persistence for the library.
//!
//! The scanner itself never persists anything; the CLI loads the prior
//! library here before a scan and saves the new one after.

use super::Library;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Loads and saves the library as a JSON file.
#[derive(Debug, Clone)]
pub struct LibraryStore {
    path: PathBuf,
}

impl LibraryStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the library. A missing file yields an empty library.
    pub fn load(&self) -> Result<Library> {
        if !self.path.exists() {
            return Ok(Library::default());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read library file: {:?}", self.path))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse library file: {:?}", self.path))
    }

    /// Save the library, creating parent directories as needed.
    pub fn save(&self, library: &Library) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create library directory: {:?}", parent))?;
        }

        let content =
            serde_json::to_string_pretty(library).with_context(|| "Failed to serialize library")?;

        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write library file: {:?}", self.path))?;

        tracing::debug!("Saved library with {} records", library.files.len());
        Ok(())
    }
}
