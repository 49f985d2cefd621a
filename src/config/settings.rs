//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application
//! settings. Configuration is loaded from a TOML file; the feed API key is
//! read from an environment variable named by `feed.api_key_env` so it never
//! lives in the config file.

use serde::Deserialize;
use std::path::Path;

use super::logging::LoggingConfig;
use crate::error::{ConfigError, Result};

/// Search feed client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// REST endpoint of the search feed.
    #[serde(default)]
    pub api_url: String,

    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Results requested per page. Must be within 1..=100.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Maximum pages followed per fetch before cutting the batch off.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Per-request timeout in seconds. Also bounds a whole refresh attempt.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts made against throttled or failing endpoints.
    #[serde(default = "default_retries")]
    pub retries: u32,
}

fn default_api_key_env() -> String {
    "TRENDSYNC_API_KEY".to_string()
}

fn default_page_size() -> u32 {
    50
}

fn default_max_pages() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_retries() -> u32 {
    3
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key_env: default_api_key_env(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
        }
    }
}

/// Cache freshness and retention settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Master cache entries older than this are refreshed incrementally.
    #[serde(default = "default_freshness_secs")]
    pub freshness_secs: i64,

    /// Below this record count a full refetch replaces the incremental path.
    #[serde(default = "default_min_records")]
    pub min_records: usize,

    /// Days of aggregated rows kept in the permanent store.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Keywords mentioned fewer times than this are not persisted.
    #[serde(default = "default_min_frequency")]
    pub min_frequency: i64,
}

fn default_freshness_secs() -> i64 {
    3600
}

fn default_min_records() -> usize {
    30
}

fn default_retention_days() -> u32 {
    30
}

fn default_min_frequency() -> i64 {
    2
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            freshness_secs: default_freshness_secs(),
            min_records: default_min_records(),
            retention_days: default_retention_days(),
            min_frequency: default_min_frequency(),
        }
    }
}

/// Main application configuration.
///
/// Aggregates all settings for the application. Load from a TOML file using
/// [`Config::load`] or parse directly with [`Config::parse_toml`].
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Path to the SQLite database file.
    ///
    /// Defaults to "trendsync.db" in the current directory.
    #[serde(default = "default_database_path")]
    pub database: String,

    /// Search feed client settings.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Cache freshness and retention settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

fn default_database_path() -> String {
    "trendsync.db".to_string()
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is
    /// malformed, or validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.feed.api_url.is_empty() {
            return Err(ConfigError::MissingField { field: "api_url" }.into());
        }
        if self.feed.page_size == 0 || self.feed.page_size > 100 {
            return Err(ConfigError::InvalidValue {
                field: "page_size",
                reason: "must be between 1 and 100".to_string(),
            }
            .into());
        }
        if self.feed.max_pages == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_pages",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.feed.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.feed.retries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retries",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.cache.freshness_secs <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "freshness_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.cache.retention_days == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retention_days",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.cache.min_frequency < 1 {
            return Err(ConfigError::InvalidValue {
                field: "min_frequency",
                reason: "must be 1 or greater".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
