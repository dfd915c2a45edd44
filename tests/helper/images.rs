//! Image fixtures

use async_trait::async_trait;
use image::{Rgba, RgbaImage};

use exo_dossier::dossier::avatar::AvatarSource;
use exo_dossier::dossier::canvas::encode_png;

pub fn solid_png(size: u32, color: [u8; 4]) -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(size, size, Rgba(color))).unwrap()
}

/// Avatar source returning the same portrait for every player
pub struct FixedAvatar(pub RgbaImage);

#[async_trait]
impl AvatarSource for FixedAvatar {
    async fn body(&self, _uuid: &str) -> Option<RgbaImage> {
        Some(self.0.clone())
    }
}
