use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to encode dossier image: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Debug, Error)]
pub enum AvatarError {
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(#[from] reqwest::Error),

    #[error("Avatar not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to decode avatar: {0}")]
    Decode(#[from] image::ImageError),
}
