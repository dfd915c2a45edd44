//! On-disk mirror of extracted gallery version archives

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use futures::StreamExt;
use futures::stream;
use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::config::MAX_CONCURRENT_DOWNLOADS;
use crate::icons::error::StoreError;
use crate::icons::gallery::IconGallery;

type PathCache = HashMap<(String, String), PathBuf>;

/// Outcome of mirroring every tracked version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub extracted: Vec<String>,
    pub failed: Vec<String>,
    pub files: usize,
}

/// Mirror of `versions/<version>/**/<item>.png` plus a lookup cache
pub struct AssetStore {
    versions_dir: PathBuf,
    path_cache: Mutex<PathCache>,
}

impl AssetStore {
    pub fn new(versions_dir: PathBuf) -> Self {
        Self {
            versions_dir,
            path_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn versions_dir(&self) -> &Path {
        &self.versions_dir
    }

    /// Lock the path cache, recovering the map if a previous holder panicked
    fn lock_cache(&self) -> MutexGuard<'_, PathCache> {
        self.path_cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// True when the mirror directory is missing or holds nothing
    pub fn is_empty(&self) -> bool {
        match std::fs::read_dir(&self.versions_dir) {
            Ok(mut entries) => entries.next().is_none(),
            Err(_) => true,
        }
    }

    /// Delete the whole mirror and start from an empty directory
    pub fn reset(&self) -> Result<(), StoreError> {
        if self.versions_dir.exists() {
            std::fs::remove_dir_all(&self.versions_dir)?;
        }
        std::fs::create_dir_all(&self.versions_dir)?;
        self.lock_cache().clear();
        Ok(())
    }

    /// Find `<item_name>.png` anywhere below the version directory.
    ///
    /// Archives nest images in arbitrary folders, so the first match of a
    /// recursive walk wins and is remembered for later lookups.
    pub fn locate(&self, version: &str, item_name: &str) -> Option<PathBuf> {
        let key = (version.to_string(), item_name.to_string());
        if let Some(path) = self.lock_cache().get(&key) {
            return Some(path.clone());
        }

        let version_dir = self.versions_dir.join(version);
        if !version_dir.is_dir() {
            return None;
        }

        let file_name = format!("{}.png", item_name);
        let found = WalkDir::new(&version_dir)
            .into_iter()
            .filter_map(Result::ok)
            .find(|entry| entry.file_type().is_file() && entry.file_name() == file_name.as_str())
            .map(|entry| entry.into_path())?;

        debug!("Located {} in {}: {:?}", item_name, version, found);
        self.lock_cache().insert(key, found.clone());
        Some(found)
    }

    /// Extract a version archive into `versions/<version>/`.
    ///
    /// The archive is unpacked into a staging directory first and renamed into
    /// place once complete, so a version directory only exists when its
    /// extraction succeeded. Returns the number of files extracted.
    pub async fn extract_archive(&self, version: &str, bytes: Vec<u8>) -> Result<usize, StoreError> {
        let target = self.versions_dir.join(version);
        let staging = self.versions_dir.join(format!(".staging-{}", version));

        let files = tokio::task::spawn_blocking(move || -> Result<usize, StoreError> {
            if staging.exists() {
                std::fs::remove_dir_all(&staging)?;
            }

            let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
            let files = archive
                .file_names()
                .filter(|name| !name.ends_with('/'))
                .count();

            if let Err(e) = archive.extract(&staging) {
                let _ = std::fs::remove_dir_all(&staging);
                return Err(e.into());
            }

            if target.exists() {
                std::fs::remove_dir_all(&target)?;
            }
            std::fs::rename(&staging, &target)?;
            Ok(files)
        })
        .await??;

        Ok(files)
    }

    /// Download and extract every version, at most
    /// [`MAX_CONCURRENT_DOWNLOADS`] at a time.
    ///
    /// A failing version is logged and skipped; the other downloads carry on.
    pub async fn download_all(&self, gallery: &dyn IconGallery, versions: &[String]) -> SyncReport {
        let results: Vec<(String, Result<usize, String>)> = stream::iter(versions.iter().cloned())
            .map(|version| async move {
                info!("Downloading icon archive {}", version);
                let result = match gallery.download_archive(&version).await {
                    Ok(bytes) => self
                        .extract_archive(&version, bytes)
                        .await
                        .map_err(|e| e.to_string()),
                    Err(e) => Err(e.to_string()),
                };
                (version, result)
            })
            .buffer_unordered(MAX_CONCURRENT_DOWNLOADS)
            .collect()
            .await;

        let mut report = SyncReport::default();
        for (version, result) in results {
            match result {
                Ok(files) => {
                    info!("Extracted {} files for {}", files, version);
                    report.files += files;
                    report.extracted.push(version);
                }
                Err(e) => {
                    error!("Failed to mirror {}: {}", version, e);
                    report.failed.push(version);
                }
            }
        }

        report.extracted.sort();
        report.failed.sort();
        report
    }

    /// Total size in bytes of every mirrored file
    pub fn disk_usage(&self) -> u64 {
        WalkDir::new(&self.versions_dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| entry.metadata().ok())
            .map(|metadata| metadata.len())
            .sum()
    }
}
