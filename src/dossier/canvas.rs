use std::io::Cursor;
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use tracing::{debug, warn};

use crate::dossier::layout::{
    BASE_HEIGHT, BASE_WIDTH, BODY_HEIGHT_RATIO, BaseRect, CANVAS_HEIGHT, CANVAS_WIDTH,
    FALLBACK_BACKGROUND,
};

/// Sources at most this wide are pixel art and scale without smoothing
const PIXEL_ART_MAX_WIDTH: u32 = 32;

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, ImageFormat::Png)?;
    Ok(cursor.into_inner())
}

/// Background canvas: the inventory texture at `path` cropped to the base
/// size and upscaled, or a flat fill when the texture is missing or broken.
/// A texture smaller than the base size is padded with transparent pixels.
pub fn load_background(path: &Path) -> RgbaImage {
    if path.exists() {
        match image::open(path) {
            Ok(texture) => {
                let crop = imageops::crop_imm(&texture.to_rgba8(), 0, 0, BASE_WIDTH, BASE_HEIGHT)
                    .to_image();
                let mut base = RgbaImage::new(BASE_WIDTH, BASE_HEIGHT);
                imageops::replace(&mut base, &crop, 0, 0);
                return imageops::resize(&base, CANVAS_WIDTH, CANVAS_HEIGHT, FilterType::Nearest);
            }
            Err(e) => warn!("Failed to decode background {:?}: {}", path, e),
        }
    } else {
        debug!("No background texture at {:?}", path);
    }

    RgbaImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, Rgba(FALLBACK_BACKGROUND))
}

/// Scale an item icon to `size`, keeping hard edges for pixel art
pub fn scale_icon(icon: &RgbaImage, size: u32) -> RgbaImage {
    let filter = if icon.width() <= PIXEL_ART_MAX_WIDTH {
        FilterType::Nearest
    } else {
        FilterType::Lanczos3
    };
    imageops::resize(icon, size, size, filter)
}

pub fn scale_silhouette(icon: &RgbaImage, size: u32) -> RgbaImage {
    imageops::resize(icon, size, size, FilterType::Nearest)
}

/// Fit a body portrait into `target` (output pixels), preserving aspect
/// ratio. Returns the scaled portrait and its top-left corner.
pub fn fit_body(body: &RgbaImage, target: BaseRect) -> Option<(RgbaImage, i64, i64)> {
    if body.width() == 0 || body.height() == 0 {
        return None;
    }

    let height = (target.height as f32 * BODY_HEIGHT_RATIO) as u32;
    let ratio = height as f32 / body.height() as f32;
    let width = ((body.width() as f32 * ratio) as u32).max(1);
    let scaled = imageops::resize(body, width, height, FilterType::Lanczos3);

    let x = i64::from(target.x) + (i64::from(target.width) - i64::from(width)).div_euclid(2);
    let y = i64::from(target.y) + (i64::from(target.height) - i64::from(height)).div_euclid(2);
    Some((scaled, x, y))
}
