use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{MetricsConfig, PROBE_TIMEOUT};
use crate::metrics::stats::{PlayerList, ServerStats};

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Metrics API URL is not configured")]
    NotConfigured,

    #[error("Invalid metrics URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Network unavailable: {0}")]
    NetworkUnavailable(#[from] reqwest::Error),

    #[error("Metrics service rejected the token")]
    Unauthorized,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Client for the game-server metrics service
#[derive(Clone)]
pub struct MetricsClient {
    client: reqwest::Client,
    api_url: String,
    api_token: Option<String>,
}

impl MetricsClient {
    pub fn new(client: reqwest::Client, api_url: &str, api_token: Option<String>) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_token,
        }
    }

    pub fn from_config(
        client: reqwest::Client,
        config: &MetricsConfig,
    ) -> Result<Self, MetricsError> {
        let api_url = config
            .api_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or(MetricsError::NotConfigured)?;
        Ok(Self::new(client, api_url, config.api_token.clone()))
    }

    pub async fn get_stats(&self) -> Result<ServerStats, MetricsError> {
        self.get_json(&self.api_url).await
    }

    pub async fn get_players(&self) -> Result<PlayerList, MetricsError> {
        self.get_json(&format!("{}/players", self.api_url)).await
    }

    fn endpoint(&self, url: &str) -> Result<reqwest::Url, MetricsError> {
        let mut endpoint = reqwest::Url::parse(url).map_err(|e| MetricsError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if let Some(token) = &self.api_token {
            endpoint.query_pairs_mut().append_pair("token", token);
        }
        Ok(endpoint)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, MetricsError> {
        let endpoint = self.endpoint(url)?;
        debug!("Querying metrics endpoint {}", url);

        let response = self
            .client
            .get(endpoint)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(MetricsError::Unauthorized);
        }
        if !status.is_success() {
            warn!("Metrics service returned status {}: {}", status, url);
            return Err(MetricsError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| MetricsError::InvalidResponse(e.to_string()))
    }
}
