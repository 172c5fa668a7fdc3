use crate::fileops::SubtitlePolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub fileops: FileOpsConfig,

    #[serde(default)]
    pub library: LibraryConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Number of concurrent probe workers.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    crate::scanner::DEFAULT_CONCURRENCY
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileOpsConfig {
    /// Which subtitle files move along with a renamed media file.
    #[serde(default)]
    pub subtitle_policy: SubtitlePolicy,

    /// Remove emptied parent folders after batch deletes.
    #[serde(default)]
    pub delete_parent_folders: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryConfig {
    /// Where the library JSON file lives. Tilde-expanded.
    #[serde(default = "default_library_path")]
    pub path: String,
}

fn default_library_path() -> String {
    "~/.local/share/archivist/library.json".to_string()
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            path: default_library_path(),
        }
    }
}

impl LibraryConfig {
    /// The library path with `~` expanded.
    pub fn resolved_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.path).as_ref())
    }
}
