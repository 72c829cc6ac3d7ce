//! Configuration infrastructure
//!
//! Contains configuration loading and management for the catalog grid
//! service. Settings are grouped by concern (fetching, storage, logging),
//! serialized as JSON, and every section carries usable defaults so a
//! missing file is not an error.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::infrastructure::catalog::CatalogSourceConfig;
use crate::infrastructure::http_client::HttpClientConfig;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Marketplace endpoints and paging limits
    pub catalog: CatalogSourceConfig,

    /// Outbound HTTP behavior (user agent, timeouts, rate limit)
    pub http: HttpClientConfig,

    /// Where datasets and task bookkeeping live
    pub storage: StorageConfig,

    /// Log level and output targets
    pub logging: LoggingConfig,
}

/// Storage locations and retention settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file holding the dataset snapshots
    pub database_path: PathBuf,

    /// Finished task records older than this many seconds are reaped
    pub task_ttl_seconds: u64,

    /// How often the reaper wakes up, in seconds
    pub reap_interval_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/datasets.db"),
            task_ttl_seconds: 24 * 60 * 60,
            reap_interval_seconds: 15 * 60,
        }
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Also write logs to a rotating file under `log_dir`
    pub file_output: bool,

    /// Directory for log files when `file_output` is on
    pub log_dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_output: false,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file.
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise fall back to defaults.
    pub async fn load_or_default(path: &Path) -> Self {
        match Self::load(path).await {
            Ok(config) => config,
            Err(err) => {
                info!("Using default configuration ({err:#})");
                Self::default()
            }
        }
    }

    /// Persist the configuration as pretty-printed JSON, creating parent
    /// directories as needed.
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(self).context("Failed to serialize configuration")?;
        fs::write(path, contents)
            .await
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}
