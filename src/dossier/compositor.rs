//! Dossier compositing
//!
//! Layers are drawn in a fixed order: background, body portrait, armor,
//! off-hand, main inventory, hotbar. Stack counts are drawn right after the
//! icon they belong to.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use image::imageops;
use tracing::{debug, info};

use crate::dossier::avatar::AvatarSource;
use crate::dossier::canvas::{
    encode_png, fit_body, load_background, scale_icon, scale_silhouette,
};
use crate::dossier::error::RenderError;
use crate::dossier::layout::{
    ARMOR_SLOTS, CANVAS_ICON_SIZE, CHARACTER_BOX, OFF_HAND, SlotPosition, armor_position,
    hotbar_slots, inventory_slots,
};
use crate::dossier::snapshot::{ItemRef, PlayerSnapshot};
use crate::dossier::text::draw_count;
use crate::icons::fetcher::{IconProvider, SlotKind, is_air};

/// Name of the optional inventory texture in the assets directory
pub const BACKGROUND_FILE_NAME: &str = "inventory_bg.png";

/// Encoded dossier image ready to be written or uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDossier {
    pub file_name: String,
    pub png: Vec<u8>,
}

/// File name of a player's dossier; anything outside ASCII alphanumerics,
/// `_` and `-` is replaced with `_`
pub fn dossier_file_name(player_name: &str) -> String {
    let sanitized: String = player_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("inventory_{}.png", sanitized)
}

pub struct DossierCompositor {
    icons: Arc<dyn IconProvider>,
    avatars: Arc<dyn AvatarSource>,
    background_path: PathBuf,
}

impl DossierCompositor {
    pub fn new(
        icons: Arc<dyn IconProvider>,
        avatars: Arc<dyn AvatarSource>,
        assets_dir: &Path,
    ) -> Self {
        Self {
            icons,
            avatars,
            background_path: assets_dir.join(BACKGROUND_FILE_NAME),
        }
    }

    /// Draw the full dossier of `snapshot`
    pub async fn compose(&self, snapshot: &PlayerSnapshot) -> RgbaImage {
        let mut canvas = load_background(&self.background_path);

        self.draw_body(&mut canvas, &snapshot.uuid).await;

        for (slot_id, kind) in ARMOR_SLOTS {
            let item = snapshot.armor_in_slot(slot_id);
            self.draw_slot(&mut canvas, item, armor_position(slot_id), Some(kind))
                .await;
        }

        self.draw_slot(
            &mut canvas,
            snapshot.off_hand.as_ref(),
            OFF_HAND,
            Some(SlotKind::Shield),
        )
        .await;

        for (slot_id, position) in inventory_slots() {
            let item = snapshot.inventory_in_slot(slot_id);
            self.draw_slot(&mut canvas, item, position, None).await;
        }

        for (slot_id, position) in hotbar_slots() {
            let item = snapshot.hotbar_in_slot(slot_id);
            self.draw_slot(&mut canvas, item, position, None).await;
        }

        canvas
    }

    /// Compose and encode the dossier of `snapshot`
    pub async fn render(&self, snapshot: &PlayerSnapshot) -> Result<RenderedDossier, RenderError> {
        let canvas = self.compose(snapshot).await;
        let png = encode_png(&canvas)?;
        let file_name = dossier_file_name(&snapshot.name);

        info!("Rendered {} ({} bytes)", file_name, png.len());
        Ok(RenderedDossier { file_name, png })
    }

    async fn draw_body(&self, canvas: &mut RgbaImage, uuid: &str) {
        if uuid.is_empty() {
            return;
        }
        let Some(body) = self.avatars.body(uuid).await else {
            debug!("Rendering without body portrait for {}", uuid);
            return;
        };
        if let Some((scaled, x, y)) = fit_body(&body, CHARACTER_BOX.scaled()) {
            imageops::overlay(canvas, &scaled, x, y);
        }
    }

    /// Draw one slot. Empty or air slots show the silhouette of `empty`
    /// when given and nothing otherwise.
    async fn draw_slot(
        &self,
        canvas: &mut RgbaImage,
        item: Option<&ItemRef>,
        position: SlotPosition,
        empty: Option<SlotKind>,
    ) {
        let (x, y) = position.canvas_origin();

        match item.filter(|item| !is_air(&item.id)) {
            Some(item) => {
                if let Some(icon) = self.icons.item_icon(&item.id).await {
                    imageops::overlay(canvas, &scale_icon(&icon, CANVAS_ICON_SIZE), x, y);
                    draw_count(canvas, item.count, x, y);
                }
            }
            None => {
                let Some(kind) = empty else {
                    return;
                };
                if let Some(silhouette) = self.icons.empty_slot_icon(kind).await {
                    imageops::overlay(
                        canvas,
                        &scale_silhouette(&silhouette, CANVAS_ICON_SIZE),
                        x,
                        y,
                    );
                }
            }
        }
    }
}
