//! Application configuration module
//!
//! Provides the sync configuration and its builder. Values can come from code
//! (builder), from a TOML document, or from defaults.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Mock create/list endpoint used when nothing else is configured
pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/posts";
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_REMOTE_LIMIT: usize = 30;
pub const DEFAULT_MAX_TEXT_LEN: usize = 300;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Remote create/list endpoint
    pub endpoint: String,
    /// Seconds between periodic sync cycles
    pub sync_interval_secs: u64,
    /// Only this many remote entries are mapped per fetch
    pub remote_limit: usize,
    /// Remote titles are truncated to this many characters
    pub max_text_len: usize,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
    /// Directory holding the durable storage slots
    pub data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            sync_interval_secs: DEFAULT_SYNC_INTERVAL_SECS,
            remote_limit: DEFAULT_REMOTE_LIMIT,
            max_text_len: DEFAULT_MAX_TEXT_LEN,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            data_dir: None,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Parse and validate a TOML document
    ///
    /// Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: AppConfig =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(self.endpoint.clone()));
        }
        if self.sync_interval_secs == 0 {
            return Err(ConfigError::MissingValue("sync_interval_secs"));
        }
        if self.remote_limit == 0 {
            return Err(ConfigError::MissingValue("remote_limit"));
        }
        if self.max_text_len == 0 {
            return Err(ConfigError::MissingValue("max_text_len"));
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    endpoint: Option<String>,
    sync_interval_secs: Option<u64>,
    remote_limit: Option<usize>,
    max_text_len: Option<usize>,
    request_timeout_secs: Option<u64>,
    data_dir: Option<PathBuf>,
}

impl AppConfigBuilder {
    /// Set the remote endpoint URL
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    pub fn sync_interval_secs(mut self, secs: u64) -> Self {
        self.sync_interval_secs = Some(secs);
        self
    }

    pub fn remote_limit(mut self, limit: usize) -> Self {
        self.remote_limit = Some(limit);
        self
    }

    pub fn max_text_len(mut self, len: usize) -> Self {
        self.max_text_len = Some(len);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            endpoint: self.endpoint.unwrap_or(defaults.endpoint),
            sync_interval_secs: self.sync_interval_secs.unwrap_or(defaults.sync_interval_secs),
            remote_limit: self.remote_limit.unwrap_or(defaults.remote_limit),
            max_text_len: self.max_text_len.unwrap_or(defaults.max_text_len),
            request_timeout_secs: self
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
            data_dir: self.data_dir,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid config file: {0}")]
    Parse(String),
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
}
