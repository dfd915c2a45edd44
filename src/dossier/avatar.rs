use image::RgbaImage;
#[cfg(test)]
use mockall::automock;
use tracing::debug;

use crate::config::AVATAR_TIMEOUT;
use crate::dossier::error::AvatarError;

/// Render size requested from the avatar service
const BODY_RENDER_SIZE: u32 = 400;

/// Source of full-body player portraits
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait AvatarSource: Send + Sync {
    /// Body portrait of the player, or `None` when unavailable
    async fn body(&self, uuid: &str) -> Option<RgbaImage>;
}

/// Avatar source backed by an mc-heads compatible HTTP service
pub struct HttpAvatarSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAvatarSource {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn fetch_body(&self, uuid: &str) -> Result<RgbaImage, AvatarError> {
        let url = format!("{}/body/{}/{}", self.base_url, uuid, BODY_RENDER_SIZE);

        let response = self
            .client
            .get(&url)
            .timeout(AVATAR_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AvatarError::NotFound(uuid.to_string()));
        }
        if !status.is_success() {
            return Err(AvatarError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let bytes = response.bytes().await?;
        Ok(image::load_from_memory(&bytes)?.to_rgba8())
    }
}

#[async_trait::async_trait]
impl AvatarSource for HttpAvatarSource {
    async fn body(&self, uuid: &str) -> Option<RgbaImage> {
        match self.fetch_body(uuid).await {
            Ok(body) => Some(body),
            Err(e) => {
                debug!("No body portrait for {}: {}", uuid, e);
                None
            }
        }
    }
}

/// Avatar source used when portraits are disabled
pub struct NoAvatar;

#[async_trait::async_trait]
impl AvatarSource for NoAvatar {
    async fn body(&self, _uuid: &str) -> Option<RgbaImage> {
        None
    }
}
