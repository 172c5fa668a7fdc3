//! Typed ID wrappers for type safety across archivist.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a media file record.
///
/// Assigned when a file is first probed and kept stable across rescans as
/// long as the file's path string matches a previously scanned record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaFileId(Uuid);

impl MediaFileId {
    /// Generate a new random media file ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MediaFileId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for MediaFileId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<MediaFileId> for Uuid {
    fn from(id: MediaFileId) -> Self {
        id.0
    }
}

impl std::fmt::Display for MediaFileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
