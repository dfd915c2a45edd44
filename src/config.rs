use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// =============================================================================
// Time-related constants
// =============================================================================

/// Timeout for the release stamp, manifest and silhouette probes (10 seconds)
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for a single version changelog fetch (5 seconds)
pub const CHANGES_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for the player body portrait fetch (5 seconds)
pub const AVATAR_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for a full version archive download (300 seconds)
pub const ARCHIVE_TIMEOUT: Duration = Duration::from_secs(300);

/// Maximum number of archive downloads running at the same time
pub const MAX_CONCURRENT_DOWNLOADS: usize = 4;

// =============================================================================
// Remote endpoints
// =============================================================================

pub const DEFAULT_GALLERY_URL: &str = "https://minecraftallimages.jemsire.com";

pub const DEFAULT_RELEASE_STAMP_URL: &str =
    "https://raw.githubusercontent.com/TinyTank800/MinecraftAllImages/refs/heads/main/version.json";

pub const DEFAULT_SILHOUETTE_BASE_URL: &str =
    "https://raw.githubusercontent.com/PrismarineJS/minecraft-assets/master/data/1.17.1/items";

pub const DEFAULT_AVATAR_URL: &str = "https://mc-heads.net";

/// Known gallery versions, newest first
pub const DEFAULT_TRACKED_VERSIONS: &[&str] = &[
    "1.21.10", "1.21.6", "1.21.5", "1.21.4", "1.20.6", "1.19.4", "1.18.2", "1.17.1", "1.16.5",
    "1.15.2", "1.14.4", "1.13.2",
];

const USER_AGENT: &str = "exo-dossier";

/// Top-level configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct DossierConfig {
    pub gallery: GalleryConfig,
    pub assets: AssetsConfig,
    pub avatar: AvatarConfig,
    pub metrics: MetricsConfig,
}

/// Remote icon gallery configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GalleryConfig {
    pub base_url: String,
    pub release_stamp_url: String,
    /// Version tags to mirror; order does not matter, they are sorted newest first
    pub tracked_versions: Vec<String>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GALLERY_URL.to_string(),
            release_stamp_url: DEFAULT_RELEASE_STAMP_URL.to_string(),
            tracked_versions: DEFAULT_TRACKED_VERSIONS
                .iter()
                .map(|v| v.to_string())
                .collect(),
        }
    }
}

/// Local asset layout configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetsConfig {
    /// Directory holding the mirror, the index file and UI images.
    /// Defaults to `<data_dir>/assets`.
    pub dir: Option<PathBuf>,
    pub silhouette_base_url: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: None,
            silhouette_base_url: DEFAULT_SILHOUETTE_BASE_URL.to_string(),
        }
    }
}

impl AssetsConfig {
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| data_dir().join("assets"))
    }
}

/// Player body portrait configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AvatarConfig {
    pub enabled: bool,
    pub base_url: String,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_AVATAR_URL.to_string(),
        }
    }
}

/// Game-server metrics service configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MetricsConfig {
    pub api_url: Option<String>,
    pub api_token: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl DossierConfig {
    /// Load configuration from `path`, falling back to defaults when the file
    /// does not exist. `API_URL` and `API_TOKEN` override the metrics section.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load_file(path)?;
        Ok(config.with_env(
            std::env::var("API_URL").ok(),
            std::env::var("API_TOKEN").ok(),
        ))
    }

    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn with_env(mut self, api_url: Option<String>, api_token: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.is_empty()) {
            self.metrics.api_url = Some(url);
        }
        if let Some(token) = api_token.filter(|t| !t.is_empty()) {
            self.metrics.api_token = Some(token);
        }
        self
    }
}

/// Build the shared HTTP client used by every remote source.
pub fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().user_agent(USER_AGENT).build()
}

/// Returns the path to the data directory for exo-dossier.
/// Uses $XDG_DATA_HOME/exo-dossier if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/exo-dossier,
/// or ./exo-dossier if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the default config file.
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("exo-dossier.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("exo-dossier")
}
