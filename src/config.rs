//! Application configuration.
//!
//! Read from `config.json` in the platform config directory (or the file
//! named by `LINKVAULT_CONFIG`). A missing file means defaults; a present but
//! malformed file is an error. `LINKVAULT_DATA_DIR` overrides `data_dir`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::platform;
use crate::types::errors::ConfigError;

pub const CONFIG_ENV: &str = "LINKVAULT_CONFIG";
pub const DATA_DIR_ENV: &str = "LINKVAULT_DATA_DIR";
pub const DATABASE_FILE: &str = "linkvault.db";

/// Top-level configuration container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    /// Page opened by the `openManager` action.
    pub manager_url: String,
    pub metadata: MetadataConfig,
    /// Seconds between background sync passes.
    pub sync_interval_secs: u64,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: platform::get_data_dir(),
            manager_url: "http://localhost:8000".to_string(),
            metadata: MetadataConfig::default(),
            sync_interval_secs: 300,
            log_filter: "linkvault=info".to_string(),
        }
    }
}

/// Endpoints and limits for remote metadata lookups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetadataConfig {
    /// CORS relay answering `{"contents": "<html>"}` for `?url=`.
    pub relay_endpoint: String,
    /// OpenGraph extraction API; the encoded URL is appended as a path segment.
    pub opengraph_endpoint: String,
    /// Generic link-metadata API taking `?url=`.
    pub link_api_endpoint: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            relay_endpoint: "https://api.allorigins.win/get".to_string(),
            opengraph_endpoint: "https://opengraph.io/api/1.1/site".to_string(),
            link_api_endpoint: "https://jsonlink.io/api/extract".to_string(),
            request_timeout_secs: 10,
            user_agent: format!("linkvault/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl AppConfig {
    /// Loads the configuration, applying environment overrides.
    ///
    /// `path_override` wins over `LINKVAULT_CONFIG`, which wins over the
    /// platform config directory.
    pub fn load(path_override: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path_override {
            Some(p) => p.to_path_buf(),
            None => match std::env::var(CONFIG_ENV) {
                Ok(p) if !p.is_empty() => PathBuf::from(p),
                _ => platform::get_config_dir().join("config.json"),
            },
        };

        let mut config = Self::from_file(&path)?;
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }
        Ok(config)
    }

    /// Reads one config file; a missing file yields defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Location of the SQLite database inside `data_dir`.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}
