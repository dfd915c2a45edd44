//! Long-lived icon catalog: index + mirror with single-flight synchronization

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::future::join_all;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::icons::gallery::IconGallery;
use crate::icons::index::{IndexRecord, VersionIndex, normalize_item_id};
use crate::icons::store::{AssetStore, SyncReport};
use crate::icons::versions::TrackedVersions;
use crate::metrics::format::format_bytes;

/// File name of the persisted index record inside the assets directory
pub const INDEX_FILE_NAME: &str = "jemsire_index.json";

/// Directory name of the mirror inside the assets directory
pub const VERSIONS_DIR_NAME: &str = "versions";

#[derive(Debug, Default)]
struct CatalogState {
    local_stamp: String,
    index: VersionIndex,
}

/// Owns the version index and the asset mirror.
///
/// Construct one instance at startup and share it. `initialize` and
/// `full_sync` are single-flight: a caller arriving while a sync is running
/// waits for it and reuses its result instead of starting another one.
pub struct IconCatalog {
    gallery: Arc<dyn IconGallery>,
    tracked: TrackedVersions,
    store: AssetStore,
    index_path: PathBuf,
    state: RwLock<CatalogState>,
    sync_lock: Mutex<()>,
    ready: AtomicBool,
}

impl IconCatalog {
    pub fn new(gallery: Arc<dyn IconGallery>, tracked: TrackedVersions, assets_dir: &Path) -> Self {
        Self {
            gallery,
            tracked,
            store: AssetStore::new(assets_dir.join(VERSIONS_DIR_NAME)),
            index_path: assets_dir.join(INDEX_FILE_NAME),
            state: RwLock::new(CatalogState::default()),
            sync_lock: Mutex::new(()),
            ready: AtomicBool::new(false),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CatalogState> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CatalogState> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    /// Release stamp the current index was built for
    pub fn local_stamp(&self) -> String {
        self.read_state().local_stamp.clone()
    }

    pub fn item_count(&self) -> usize {
        self.read_state().index.len()
    }

    /// Load the persisted index and synchronize when the gallery moved on.
    ///
    /// Never fails: an unreachable gallery leaves the local index in place.
    pub async fn initialize(&self) {
        if self.is_ready() {
            return;
        }

        let _guard = self.sync_lock.lock().await;
        if self.is_ready() {
            debug!("Catalog initialized by a concurrent caller");
            return;
        }

        let mut needs_rebuild = match IndexRecord::load(&self.index_path) {
            Ok(Some(record)) => {
                info!(
                    "Loaded icon index {:?} with {} items",
                    record.version,
                    record.index.len()
                );
                let mut state = self.write_state();
                state.local_stamp = record.version;
                state.index = record.index;
                false
            }
            Ok(None) => {
                info!("No icon index at {:?}", self.index_path);
                true
            }
            Err(e) => {
                warn!("Discarding unreadable icon index {:?}: {}", self.index_path, e);
                true
            }
        };

        let mut stamp = self.local_stamp();

        info!("Checking icon gallery for updates");
        match self.gallery.fetch_release_stamp().await {
            Ok(remote) if remote != stamp => {
                info!("New icon gallery release available: {}", remote);
                stamp = remote;
                needs_rebuild = true;
            }
            Ok(_) if self.store.is_empty() => {
                warn!("Local icon mirror is missing, synchronizing");
                needs_rebuild = true;
            }
            Ok(_) => info!("Local icon mirror {} is up to date", stamp),
            Err(e) => warn!("Using local icon mirror (gallery unreachable: {})", e),
        }

        if needs_rebuild {
            self.sync_locked(stamp).await;
        }

        self.ready.store(true, Ordering::Release);
    }

    /// Force a full synchronization of the mirror and the index
    pub async fn full_sync(&self) -> SyncReport {
        let _guard = self.sync_lock.lock().await;

        let stamp = match self.gallery.fetch_release_stamp().await {
            Ok(remote) => remote,
            Err(e) => {
                warn!("Could not refresh gallery release stamp: {}", e);
                self.local_stamp()
            }
        };

        let report = self.sync_locked(stamp).await;
        self.ready.store(true, Ordering::Release);
        report
    }

    /// Wipe the mirror, download every tracked version and rebuild the index.
    /// Callers must hold `sync_lock`.
    async fn sync_locked(&self, stamp: String) -> SyncReport {
        info!("Starting full icon synchronization");

        if let Err(e) = self.store.reset() {
            error!("Failed to reset icon mirror {:?}: {}", self.store.versions_dir(), e);
        }

        let report = self
            .store
            .download_all(&*self.gallery, self.tracked.as_slice())
            .await;

        let index = self.rebuild_index().await;
        let record = IndexRecord {
            version: stamp,
            index,
        };

        if let Err(e) = record.save(&self.index_path) {
            error!("Failed to save icon index {:?}: {}", self.index_path, e);
        }

        let item_count = record.index.len();
        {
            let mut state = self.write_state();
            state.local_stamp = record.version;
            state.index = record.index;
        }

        info!(
            "Icon mirror ready: {} items | {} | {} versions failed",
            item_count,
            format_bytes(self.store.disk_usage()),
            report.failed.len()
        );
        report
    }

    /// Re-derive the index from the gallery manifest and changelogs.
    ///
    /// Every fetch may fail independently; failures are skipped and the index
    /// is built from whatever arrived.
    pub async fn rebuild_index(&self) -> VersionIndex {
        info!("Rebuilding icon index from gallery metadata");

        let manifest = self
            .gallery
            .fetch_manifest()
            .await
            .inspect_err(|e| warn!("Failed to fetch gallery manifest: {}", e))
            .unwrap_or_default();

        let futures = self.tracked.newest_first().map(|version| async move {
            let changes = self
                .gallery
                .fetch_changes(version)
                .await
                .inspect_err(|e| warn!("Failed to fetch changes for {}: {}", version, e))
                .ok();
            (version.to_string(), changes)
        });

        let changes: HashMap<_, _> = join_all(futures)
            .await
            .into_iter()
            .filter_map(|(version, changes)| changes.map(|c| (version, c)))
            .collect();

        debug!(
            "Building index from {} manifest entries and {} changelogs",
            manifest.len(),
            changes.len()
        );
        VersionIndex::build(&manifest, &changes, &self.tracked)
    }

    /// Version holding the icon of `item_id`
    pub fn lookup(&self, item_id: &str) -> Option<String> {
        self.read_state().index.lookup(item_id).map(str::to_string)
    }

    /// On-disk path of the icon of `item_id`
    pub fn locate(&self, item_id: &str) -> Option<PathBuf> {
        let version = self.lookup(item_id)?;
        self.store.locate(&version, &normalize_item_id(item_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icons::error::GalleryError;
    use crate::icons::gallery::{MockIconGallery, VersionChanges};
    use crate::icons::store::tests::zip_archive;
    use tempfile::TempDir;

    fn network_down() -> GalleryError {
        GalleryError::InvalidResponse("connection refused".to_string())
    }

    fn write_record(assets_dir: &Path, stamp: &str, items: &[(&str, &str)]) {
        IndexRecord {
            version: stamp.to_string(),
            index: items.iter().copied().collect(),
        }
        .save(&assets_dir.join(INDEX_FILE_NAME))
        .unwrap();
    }

    fn tracked() -> TrackedVersions {
        TrackedVersions::new(["1.21.4", "1.16.5"])
    }

    #[tokio::test]
    async fn initialize_keeps_local_index_when_gallery_is_unreachable() {
        let temp_dir = TempDir::new().unwrap();
        write_record(temp_dir.path(), "stamp-1", &[("stone", "1.16.5")]);

        let mut gallery = MockIconGallery::new();
        gallery
            .expect_fetch_release_stamp()
            .times(1)
            .returning(|| Err(network_down()));
        gallery.expect_download_archive().times(0);
        gallery.expect_fetch_manifest().times(0);

        let catalog = IconCatalog::new(Arc::new(gallery), tracked(), temp_dir.path());
        catalog.initialize().await;

        assert!(catalog.is_ready());
        assert_eq!(catalog.local_stamp(), "stamp-1");
        assert_eq!(catalog.lookup("minecraft:stone"), Some("1.16.5".to_string()));
    }

    #[tokio::test]
    async fn initialize_skips_sync_when_stamp_matches_and_mirror_exists() {
        let temp_dir = TempDir::new().unwrap();
        write_record(temp_dir.path(), "stamp-1", &[("stone", "1.21.4")]);
        std::fs::create_dir_all(temp_dir.path().join("versions/1.21.4")).unwrap();

        let mut gallery = MockIconGallery::new();
        gallery
            .expect_fetch_release_stamp()
            .times(1)
            .returning(|| Ok("stamp-1".to_string()));
        gallery.expect_download_archive().times(0);

        let catalog = IconCatalog::new(Arc::new(gallery), tracked(), temp_dir.path());
        catalog.initialize().await;

        assert_eq!(catalog.item_count(), 1);
    }

    #[tokio::test]
    async fn initialize_syncs_when_remote_stamp_changes() {
        let temp_dir = TempDir::new().unwrap();
        write_record(temp_dir.path(), "stamp-1", &[("stone", "1.21.4")]);
        std::fs::create_dir_all(temp_dir.path().join("versions/1.21.4")).unwrap();

        let mut gallery = MockIconGallery::new();
        gallery
            .expect_fetch_release_stamp()
            .times(1)
            .returning(|| Ok("stamp-2".to_string()));
        gallery
            .expect_download_archive()
            .times(2)
            .returning(|_| Ok(zip_archive(&[("items/ancient_debris.png", "png")])));
        gallery
            .expect_fetch_manifest()
            .times(1)
            .returning(|| Ok(vec!["ancient_debris.png".to_string()]));
        gallery
            .expect_fetch_changes()
            .withf(|version| version == "1.16.5")
            .returning(|_| {
                Ok(VersionChanges {
                    added: vec!["ancient_debris.png".to_string()],
                    modified: vec![],
                })
            });
        gallery
            .expect_fetch_changes()
            .withf(|version| version == "1.21.4")
            .returning(|_| Err(network_down()));

        let catalog = IconCatalog::new(Arc::new(gallery), tracked(), temp_dir.path());
        catalog.initialize().await;

        assert_eq!(catalog.local_stamp(), "stamp-2");
        assert_eq!(catalog.lookup("minecraft:stone"), None);
        assert_eq!(
            catalog.lookup("minecraft:ancient_debris"),
            Some("1.16.5".to_string())
        );
        assert!(catalog.locate("minecraft:ancient_debris").is_some());

        let persisted = IndexRecord::load(&temp_dir.path().join(INDEX_FILE_NAME))
            .unwrap()
            .unwrap();
        assert_eq!(persisted.version, "stamp-2");
        assert_eq!(persisted.index.lookup("ancient_debris"), Some("1.16.5"));
    }

    #[tokio::test]
    async fn initialize_syncs_when_mirror_is_missing() {
        let temp_dir = TempDir::new().unwrap();
        write_record(temp_dir.path(), "stamp-1", &[("stone", "1.21.4")]);

        let mut gallery = MockIconGallery::new();
        gallery
            .expect_fetch_release_stamp()
            .returning(|| Ok("stamp-1".to_string()));
        gallery
            .expect_download_archive()
            .times(2)
            .returning(|_| Ok(zip_archive(&[("stone.png", "png")])));
        gallery
            .expect_fetch_manifest()
            .returning(|| Ok(vec!["stone.png".to_string()]));
        gallery
            .expect_fetch_changes()
            .returning(|_| Ok(VersionChanges::default()));

        let catalog = IconCatalog::new(Arc::new(gallery), tracked(), temp_dir.path());
        catalog.initialize().await;

        assert!(!catalog.store().is_empty());
        assert_eq!(catalog.lookup("stone"), Some("1.21.4".to_string()));
        assert!(catalog.locate("minecraft:stone").is_some());
    }

    #[tokio::test]
    async fn concurrent_initialize_runs_a_single_sync() {
        let temp_dir = TempDir::new().unwrap();

        let mut gallery = MockIconGallery::new();
        gallery
            .expect_fetch_release_stamp()
            .times(1)
            .returning(|| Ok("stamp-1".to_string()));
        gallery
            .expect_download_archive()
            .times(2)
            .returning(|_| Ok(zip_archive(&[("stone.png", "png")])));
        gallery
            .expect_fetch_manifest()
            .times(1)
            .returning(|| Ok(vec!["stone.png".to_string()]));
        gallery
            .expect_fetch_changes()
            .times(2)
            .returning(|_| Ok(VersionChanges::default()));

        let catalog = IconCatalog::new(Arc::new(gallery), tracked(), temp_dir.path());
        tokio::join!(catalog.initialize(), catalog.initialize(), catalog.initialize());

        assert!(catalog.is_ready());
        assert_eq!(catalog.item_count(), 1);
    }

    #[tokio::test]
    async fn rebuild_index_tolerates_every_fetch_failing() {
        let temp_dir = TempDir::new().unwrap();

        let mut gallery = MockIconGallery::new();
        gallery
            .expect_fetch_manifest()
            .returning(|| Err(network_down()));
        gallery
            .expect_fetch_changes()
            .returning(|_| Err(network_down()));

        let catalog = IconCatalog::new(Arc::new(gallery), tracked(), temp_dir.path());
        let index = catalog.rebuild_index().await;

        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn lookup_returns_none_before_initialize() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = IconCatalog::new(
            Arc::new(MockIconGallery::new()),
            tracked(),
            temp_dir.path(),
        );

        assert_eq!(catalog.lookup("minecraft:stone"), None);
        assert_eq!(catalog.locate("minecraft:stone"), None);
    }
}
