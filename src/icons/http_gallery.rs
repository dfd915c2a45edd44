//! HTTP implementation of the icon gallery

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::config::{ARCHIVE_TIMEOUT, CHANGES_TIMEOUT, PROBE_TIMEOUT};
use crate::icons::error::GalleryError;
use crate::icons::gallery::{IconGallery, VersionChanges};

/// Response from the release stamp endpoint
#[derive(Debug, Deserialize)]
struct ReleaseStamp {
    #[serde(default)]
    message: String,
}

/// Response from the manifest endpoint
#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    images: Vec<String>,
}

/// Gallery implementation backed by the public icon gallery website
#[derive(Clone)]
pub struct HttpGallery {
    client: reqwest::Client,
    base_url: String,
    release_stamp_url: String,
}

impl HttpGallery {
    /// Creates a new HttpGallery with custom endpoints
    pub fn new(client: reqwest::Client, base_url: &str, release_stamp_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            release_stamp_url: release_stamp_url.to_string(),
        }
    }

    async fn get(&self, url: &str, timeout: Duration) -> Result<reqwest::Response, GalleryError> {
        let response = self.client.get(url).timeout(timeout).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GalleryError::NotFound(url.to_string()));
        }

        if !status.is_success() {
            warn!("Gallery returned status {}: {}", status, url);
            return Err(GalleryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        Ok(response)
    }

    /// Fetch a JSON object document.
    ///
    /// The gallery answers unknown paths with an HTML page and a 200 status, so
    /// bodies that do not open a JSON object are rejected before parsing.
    async fn get_json_object<T: DeserializeOwned>(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<T, GalleryError> {
        let text = self.get(url, timeout).await?.text().await?;

        if !text.trim_start().starts_with('{') {
            return Err(GalleryError::InvalidResponse(format!(
                "Expected a JSON object from {}",
                url
            )));
        }

        serde_json::from_str(&text).map_err(|e| {
            warn!("Failed to parse gallery response from {}: {}", url, e);
            GalleryError::InvalidResponse(e.to_string())
        })
    }
}

#[async_trait::async_trait]
impl IconGallery for HttpGallery {
    async fn fetch_release_stamp(&self) -> Result<String, GalleryError> {
        let stamp: ReleaseStamp = self
            .get_json_object(&self.release_stamp_url, PROBE_TIMEOUT)
            .await?;
        Ok(stamp.message)
    }

    async fn fetch_manifest(&self) -> Result<Vec<String>, GalleryError> {
        let url = format!("{}/manifest.json", self.base_url);
        let manifest: Manifest = self.get_json_object(&url, PROBE_TIMEOUT).await?;
        Ok(manifest.images)
    }

    async fn fetch_changes(&self, version: &str) -> Result<VersionChanges, GalleryError> {
        let url = format!("{}/images/{}/changes.json", self.base_url, version);
        self.get_json_object(&url, CHANGES_TIMEOUT).await
    }

    async fn download_archive(&self, version: &str) -> Result<Vec<u8>, GalleryError> {
        let url = format!("{}/images/{}.zip", self.base_url, version);
        let bytes = self.get(&url, ARCHIVE_TIMEOUT).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}
