//! In-memory icon gallery for integration tests

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use exo_dossier::icons::error::GalleryError;
use exo_dossier::icons::gallery::{IconGallery, VersionChanges};

struct FakeVersion {
    changes: VersionChanges,
    icons: Vec<(String, Vec<u8>)>,
}

/// Gallery serving fixed versions from memory
pub struct FakeGallery {
    stamp: Option<String>,
    versions: BTreeMap<String, FakeVersion>,
    downloads: AtomicUsize,
}

impl FakeGallery {
    pub fn new(stamp: &str) -> Self {
        Self {
            stamp: Some(stamp.to_string()),
            versions: BTreeMap::new(),
            downloads: AtomicUsize::new(0),
        }
    }

    /// Gallery whose every request fails
    pub fn offline() -> Self {
        Self {
            stamp: None,
            versions: BTreeMap::new(),
            downloads: AtomicUsize::new(0),
        }
    }

    /// Add a version whose changelog lists `added` and whose archive holds
    /// `icons` under `items/`
    pub fn with_version(mut self, version: &str, added: &[&str], icons: &[(&str, Vec<u8>)]) -> Self {
        self.versions.insert(
            version.to_string(),
            FakeVersion {
                changes: VersionChanges {
                    added: added.iter().map(|name| format!("{}.png", name)).collect(),
                    modified: vec![],
                },
                icons: icons
                    .iter()
                    .map(|(name, png)| (name.to_string(), png.clone()))
                    .collect(),
            },
        );
        self
    }

    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    fn offline_error() -> GalleryError {
        GalleryError::InvalidResponse("gallery is offline".to_string())
    }
}

#[async_trait]
impl IconGallery for FakeGallery {
    async fn fetch_release_stamp(&self) -> Result<String, GalleryError> {
        self.stamp.clone().ok_or_else(Self::offline_error)
    }

    async fn fetch_manifest(&self) -> Result<Vec<String>, GalleryError> {
        if self.stamp.is_none() {
            return Err(Self::offline_error());
        }
        let names: BTreeSet<String> = self
            .versions
            .values()
            .flat_map(|v| v.icons.iter().map(|(name, _)| format!("{}.png", name)))
            .collect();
        Ok(names.into_iter().collect())
    }

    async fn fetch_changes(&self, version: &str) -> Result<VersionChanges, GalleryError> {
        if self.stamp.is_none() {
            return Err(Self::offline_error());
        }
        self.versions
            .get(version)
            .map(|v| v.changes.clone())
            .ok_or_else(|| GalleryError::NotFound(version.to_string()))
    }

    async fn download_archive(&self, version: &str) -> Result<Vec<u8>, GalleryError> {
        if self.stamp.is_none() {
            return Err(Self::offline_error());
        }
        let fake = self
            .versions
            .get(version)
            .ok_or_else(|| GalleryError::NotFound(version.to_string()))?;
        self.downloads.fetch_add(1, Ordering::SeqCst);

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, png) in &fake.icons {
            writer.start_file(format!("items/{}.png", name), options).unwrap();
            writer.write_all(png).unwrap();
        }
        Ok(writer.finish().unwrap().into_inner())
    }
}
