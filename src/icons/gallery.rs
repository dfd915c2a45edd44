//! Gallery trait for fetching icon metadata and archives from a remote source

#[cfg(test)]
use mockall::automock;
use serde::Deserialize;

use crate::icons::error::GalleryError;

/// Icons recorded as changed in one gallery version
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VersionChanges {
    pub added: Vec<String>,
    pub modified: Vec<String>,
}

impl VersionChanges {
    /// Every icon name touched by this version, added first
    pub fn touched(&self) -> impl Iterator<Item = &str> {
        self.added
            .iter()
            .chain(self.modified.iter())
            .map(String::as_str)
    }
}

/// Trait for fetching gallery data
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait IconGallery: Send + Sync {
    /// Fetches the opaque stamp identifying the current gallery release
    async fn fetch_release_stamp(&self) -> Result<String, GalleryError>;

    /// Fetches the names of every icon known to the gallery
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - Icon file names as published (e.g. "iron_helmet.png")
    /// * `Err(GalleryError)` - If the fetch fails
    async fn fetch_manifest(&self) -> Result<Vec<String>, GalleryError>;

    /// Fetches the icons added or modified in a single version
    async fn fetch_changes(&self, version: &str) -> Result<VersionChanges, GalleryError>;

    /// Downloads the zip archive holding every icon of a version
    async fn download_archive(&self, version: &str) -> Result<Vec<u8>, GalleryError>;
}
