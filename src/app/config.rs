use crate::app::storage::FileStorage;
use crate::shared::config::{AppConfig, ConfigError};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Overrides the remote endpoint
pub const ENDPOINT_ENV: &str = "QUOTE_SYNC_ENDPOINT";
/// Overrides the storage directory
pub const DATA_DIR_ENV: &str = "QUOTE_SYNC_DATA_DIR";
/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "quote-sync.toml";

/// Application configuration wrapper.
#[derive(Debug, Clone, Default)]
pub struct Config {
    app: AppConfig,
}

impl Config {
    /// Load a TOML file, then apply environment overrides
    ///
    /// Without an explicit path, `quote-sync.toml` is read when it exists and
    /// defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let app = match path {
            Some(path) => AppConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    AppConfig::from_toml_str(&std::fs::read_to_string(fallback)?)?
                } else {
                    AppConfig::default()
                }
            }
        };
        Self::from_parts(app, env_lookup)
    }

    fn from_parts(
        mut app: AppConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(endpoint) = lookup(ENDPOINT_ENV) {
            app.endpoint = endpoint;
        }
        if let Some(dir) = lookup(DATA_DIR_ENV) {
            app.data_dir = Some(PathBuf::from(dir));
        }
        app.validate()?;
        Ok(Self { app })
    }

    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    pub fn endpoint(&self) -> &str {
        &self.app.endpoint
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.app.sync_interval_secs)
    }

    /// Storage directory, the platform data dir unless configured
    pub fn data_dir(&self) -> PathBuf {
        self.app
            .data_dir
            .clone()
            .unwrap_or_else(FileStorage::default_dir)
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
