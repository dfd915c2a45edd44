//! Resolution of item identifiers and empty equipment slots into images

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
#[cfg(test)]
use mockall::automock;
use tracing::{debug, info, warn};

use crate::config::PROBE_TIMEOUT;
use crate::icons::catalog::IconCatalog;
use crate::icons::error::GalleryError;
use crate::icons::index::normalize_item_id;

/// Item name used by the game for an empty slot
pub const AIR_ITEM: &str = "air";

/// Silhouette files at or below this size are placeholders written after a
/// failed download and are fetched again on the next prefetch
const PLACEHOLDER_MAX_BYTES: u64 = 100;

/// Edge length of the transparent placeholder silhouette
const PLACEHOLDER_SIZE: u32 = 16;

/// Equipment slot that shows a silhouette while empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Helmet,
    Chestplate,
    Leggings,
    Boots,
    Shield,
}

impl SlotKind {
    pub const ALL: [SlotKind; 5] = [
        SlotKind::Helmet,
        SlotKind::Chestplate,
        SlotKind::Leggings,
        SlotKind::Boots,
        SlotKind::Shield,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotKind::Helmet => "helmet",
            SlotKind::Chestplate => "chestplate",
            SlotKind::Leggings => "leggings",
            SlotKind::Boots => "boots",
            SlotKind::Shield => "shield",
        }
    }
}

/// Whether the identifier names the empty-slot sentinel item
pub fn is_air(item_id: &str) -> bool {
    item_id.is_empty() || normalize_item_id(item_id) == AIR_ITEM
}

/// Source of decoded icons for the compositor
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait IconProvider: Send + Sync {
    /// Icon of an item, or `None` when no icon is available
    async fn item_icon(&self, item_id: &str) -> Option<RgbaImage>;

    /// Silhouette drawn in an empty equipment slot
    async fn empty_slot_icon(&self, slot: SlotKind) -> Option<RgbaImage>;
}

/// Resolves icons from the local mirror and silhouettes from the UI cache
pub struct IconFetcher {
    catalog: Arc<IconCatalog>,
    client: reqwest::Client,
    ui_dir: PathBuf,
    silhouette_base_url: String,
}

impl IconFetcher {
    pub fn new(
        catalog: Arc<IconCatalog>,
        client: reqwest::Client,
        ui_dir: PathBuf,
        silhouette_base_url: &str,
    ) -> Self {
        Self {
            catalog,
            client,
            ui_dir,
            silhouette_base_url: silhouette_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn catalog(&self) -> &Arc<IconCatalog> {
        &self.catalog
    }

    /// Bring the catalog up and make sure every silhouette is on disk
    pub async fn initialize(&self) {
        self.catalog.initialize().await;
        self.prefetch_silhouettes().await;
    }

    /// Decode the icon of `item_id` from the local mirror.
    ///
    /// Absence is an expected outcome: air yields `None` without touching the
    /// network or the disk, and a missing icon yields `None` with a warning.
    pub async fn resolve(&self, item_id: &str) -> Option<RgbaImage> {
        if is_air(item_id) {
            return None;
        }

        self.catalog.initialize().await;

        let catalog = self.catalog.clone();
        let id = item_id.to_string();
        let located = tokio::task::spawn_blocking(move || {
            let path = catalog.locate(&id)?;
            let decoded = image::open(&path);
            Some((path, decoded))
        })
        .await;

        match located {
            Ok(Some((_, Ok(icon)))) => Some(icon.to_rgba8()),
            Ok(Some((path, Err(e)))) => {
                warn!("Failed to decode icon {:?}: {}", path, e);
                None
            }
            Ok(None) => {
                warn!("Icon for {} not found in local mirror", normalize_item_id(item_id));
                None
            }
            Err(e) => {
                warn!("Icon lookup for {} failed: {}", item_id, e);
                None
            }
        }
    }

    fn silhouette_path(&self, slot: SlotKind) -> PathBuf {
        self.ui_dir.join(format!("empty_{}.png", slot.as_str()))
    }

    /// Silhouette of an empty equipment slot.
    ///
    /// A silhouette missing on disk is downloaded on first use; when that
    /// fails a transparent placeholder is stored and returned instead.
    pub async fn resolve_empty_slot(&self, slot: SlotKind) -> Option<RgbaImage> {
        let path = self.silhouette_path(slot);

        if path.exists() {
            return match image::open(&path) {
                Ok(icon) => Some(icon.to_rgba8()),
                Err(e) => {
                    warn!("Failed to decode silhouette {:?}: {}", path, e);
                    Some(placeholder())
                }
            };
        }

        match self.download_silhouette(slot, &path).await {
            Ok(icon) => Some(icon),
            Err(e) => {
                warn!("Failed to download {} silhouette: {}", slot.as_str(), e);
                Some(store_placeholder(&path))
            }
        }
    }

    /// Download every silhouette that is missing or still a placeholder
    pub async fn prefetch_silhouettes(&self) {
        for slot in SlotKind::ALL {
            let path = self.silhouette_path(slot);
            let is_current = std::fs::metadata(&path)
                .map(|m| m.len() > PLACEHOLDER_MAX_BYTES)
                .unwrap_or(false);
            if is_current {
                continue;
            }

            info!("Downloading {} silhouette", slot.as_str());
            if let Err(e) = self.download_silhouette(slot, &path).await {
                warn!("Failed to download {} silhouette: {}", slot.as_str(), e);
                if !path.exists() {
                    store_placeholder(&path);
                }
            }
        }
    }

    async fn download_silhouette(
        &self,
        slot: SlotKind,
        path: &Path,
    ) -> Result<RgbaImage, GalleryError> {
        let url = format!(
            "{}/empty_armor_slot_{}.png",
            self.silhouette_base_url,
            slot.as_str()
        );

        let response = self
            .client
            .get(&url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GalleryError::NotFound(url));
        }
        if !status.is_success() {
            return Err(GalleryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let bytes = response.bytes().await?;
        let icon = image::load_from_memory(&bytes)
            .map_err(|e| GalleryError::InvalidResponse(e.to_string()))?
            .to_rgba8();

        if let Err(e) = write_file(path, &bytes) {
            warn!("Failed to cache silhouette {:?}: {}", path, e);
        } else {
            debug!("Cached {} silhouette at {:?}", slot.as_str(), path);
        }

        Ok(icon)
    }
}

#[async_trait::async_trait]
impl IconProvider for IconFetcher {
    async fn item_icon(&self, item_id: &str) -> Option<RgbaImage> {
        self.resolve(item_id).await
    }

    async fn empty_slot_icon(&self, slot: SlotKind) -> Option<RgbaImage> {
        self.resolve_empty_slot(slot).await
    }
}

fn placeholder() -> RgbaImage {
    RgbaImage::new(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE)
}

/// Write a transparent placeholder to `path` and return it
fn store_placeholder(path: &Path) -> RgbaImage {
    let icon = placeholder();
    let saved = path
        .parent()
        .map_or(Ok(()), std::fs::create_dir_all)
        .map_err(image::ImageError::IoError)
        .and_then(|_| icon.save(path));
    if let Err(e) = saved {
        warn!("Failed to store placeholder silhouette {:?}: {}", path, e);
    }
    icon
}

fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dossier::canvas::encode_png;
    use crate::icons::catalog::{INDEX_FILE_NAME, IconCatalog};
    use crate::icons::gallery::MockIconGallery;
    use crate::icons::index::IndexRecord;
    use crate::icons::versions::TrackedVersions;
    use image::Rgba;
    use mockito::Server;
    use rstest::rstest;
    use tempfile::TempDir;

    fn offline_gallery() -> MockIconGallery {
        let mut gallery = MockIconGallery::new();
        gallery.expect_fetch_release_stamp().returning(|| {
            Err(GalleryError::InvalidResponse("offline".to_string()))
        });
        gallery
    }

    fn create_fetcher(
        assets_dir: &Path,
        gallery: MockIconGallery,
        silhouette_url: &str,
    ) -> IconFetcher {
        let catalog = IconCatalog::new(
            Arc::new(gallery),
            TrackedVersions::new(["1.21.4"]),
            assets_dir,
        );
        IconFetcher::new(
            Arc::new(catalog),
            reqwest::Client::new(),
            assets_dir.join("ui"),
            silhouette_url,
        )
    }

    fn solid_png(size: u32, color: [u8; 4]) -> Vec<u8> {
        encode_png(&RgbaImage::from_pixel(size, size, Rgba(color))).unwrap()
    }

    #[rstest]
    #[case("minecraft:air", true)]
    #[case("AIR", true)]
    #[case("", true)]
    #[case("minecraft:stone", false)]
    #[case("minecraft:cave_air", false)]
    fn is_air_detects_empty_slot_sentinel(#[case] item_id: &str, #[case] expected: bool) {
        assert_eq!(is_air(item_id), expected);
    }

    #[tokio::test]
    async fn resolve_air_touches_neither_network_nor_disk() {
        let temp_dir = TempDir::new().unwrap();
        // No expectations: any gallery call would panic
        let fetcher = create_fetcher(temp_dir.path(), MockIconGallery::new(), "http://unused");

        assert!(fetcher.resolve("minecraft:air").await.is_none());
        assert!(!fetcher.catalog().is_ready());
        assert!(!temp_dir.path().join(INDEX_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn resolve_decodes_icon_from_mirror() {
        let temp_dir = TempDir::new().unwrap();
        IndexRecord {
            version: "stamp-1".to_string(),
            index: [("iron_helmet", "1.21.4")].into_iter().collect(),
        }
        .save(&temp_dir.path().join(INDEX_FILE_NAME))
        .unwrap();
        let icon_dir = temp_dir.path().join("versions/1.21.4/items");
        std::fs::create_dir_all(&icon_dir).unwrap();
        std::fs::write(
            icon_dir.join("iron_helmet.png"),
            solid_png(16, [200, 200, 200, 255]),
        )
        .unwrap();

        let fetcher = create_fetcher(temp_dir.path(), offline_gallery(), "http://unused");
        let icon = fetcher.resolve("minecraft:iron_helmet").await.unwrap();

        assert_eq!(icon.dimensions(), (16, 16));
        assert_eq!(icon.get_pixel(3, 3), &Rgba([200, 200, 200, 255]));
    }

    #[tokio::test]
    async fn resolve_returns_none_for_unknown_item() {
        let temp_dir = TempDir::new().unwrap();
        IndexRecord::default()
            .save(&temp_dir.path().join(INDEX_FILE_NAME))
            .unwrap();

        let fetcher = create_fetcher(temp_dir.path(), offline_gallery(), "http://unused");

        assert!(fetcher.resolve("minecraft:unobtainium").await.is_none());
        assert!(fetcher.catalog().is_ready());
    }

    #[tokio::test]
    async fn resolve_empty_slot_downloads_once_then_reads_disk() {
        let temp_dir = TempDir::new().unwrap();
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/empty_armor_slot_helmet.png")
            .with_status(200)
            .with_body(solid_png(16, [10, 20, 30, 255]))
            .expect(1)
            .create_async()
            .await;

        let fetcher = create_fetcher(temp_dir.path(), MockIconGallery::new(), &server.url());

        let first = fetcher.resolve_empty_slot(SlotKind::Helmet).await.unwrap();
        let second = fetcher.resolve_empty_slot(SlotKind::Helmet).await.unwrap();

        mock.assert_async().await;
        assert_eq!(first, second);
        assert_eq!(first.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
        assert!(temp_dir.path().join("ui/empty_helmet.png").is_file());
    }

    #[tokio::test]
    async fn resolve_empty_slot_falls_back_to_transparent_placeholder() {
        let temp_dir = TempDir::new().unwrap();
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/empty_armor_slot_shield.png")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = create_fetcher(temp_dir.path(), MockIconGallery::new(), &server.url());
        let icon = fetcher.resolve_empty_slot(SlotKind::Shield).await.unwrap();

        mock.assert_async().await;
        assert_eq!(icon.dimensions(), (16, 16));
        assert!(icon.pixels().all(|p| p.0[3] == 0));
        assert!(temp_dir.path().join("ui/empty_shield.png").is_file());
    }

    #[tokio::test]
    async fn prefetch_replaces_placeholders_and_keeps_real_silhouettes() {
        let temp_dir = TempDir::new().unwrap();
        let ui_dir = temp_dir.path().join("ui");
        std::fs::create_dir_all(&ui_dir).unwrap();
        // Real silhouette, larger than a placeholder
        let real = vec![7u8; 512];
        for slot in ["chestplate", "leggings", "boots", "shield"] {
            std::fs::write(ui_dir.join(format!("empty_{}.png", slot)), &real).unwrap();
        }
        // Leftover placeholder from an earlier failed download
        std::fs::write(ui_dir.join("empty_helmet.png"), [0u8; 40]).unwrap();

        let mut server = Server::new_async().await;
        let helmet = server
            .mock("GET", "/empty_armor_slot_helmet.png")
            .with_status(200)
            .with_body(solid_png(16, [1, 2, 3, 255]))
            .expect(1)
            .create_async()
            .await;

        let fetcher = create_fetcher(temp_dir.path(), MockIconGallery::new(), &server.url());
        fetcher.prefetch_silhouettes().await;

        helmet.assert_async().await;
        assert_eq!(
            std::fs::read(ui_dir.join("empty_helmet.png")).unwrap(),
            solid_png(16, [1, 2, 3, 255])
        );
        assert_eq!(std::fs::read(ui_dir.join("empty_boots.png")).unwrap(), real);
    }
}
