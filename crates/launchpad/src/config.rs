//! Configuration management for launchpad.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::launch::Page;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "launchpad";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "launches.db";

/// Default launch data provider.
pub const DEFAULT_PROVIDER_URL: &str = "https://api.spacexdata.com/v4/launches/query";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `LAUNCHPAD_`)
/// 2. TOML config file at `~/.config/launchpad/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Launch data ingestion configuration.
    pub ingest: IngestConfig,
    /// HTTP API behavior.
    pub api: ApiConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/launchpad/launches.db`
    pub database_path: Option<PathBuf>,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

/// Ingestion configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Launch catalog query endpoint.
    pub provider_url: String,
    /// Load the catalog when the server starts, unless already loaded.
    pub load_on_startup: bool,
    /// Provider request timeout in seconds.
    pub timeout_secs: u64,
}

/// HTTP API configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Page size used when a request has no `limit`. 0 means unlimited.
    pub default_limit: u64,
    /// Upper bound on any requested page size. 0 means unlimited.
    pub max_limit: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            provider_url: DEFAULT_PROVIDER_URL.to_string(),
            load_on_startup: true,
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Resolve request pagination parameters into a [`Page`].
    ///
    /// A missing `limit` falls back to `default_limit`; any limit is clamped
    /// to `max_limit` when that is set.
    #[must_use]
    pub fn page(&self, skip: Option<u64>, limit: Option<u64>) -> Page {
        let mut limit = limit.unwrap_or(self.default_limit);
        if self.max_limit > 0 && (limit == 0 || limit > self.max_limit) {
            limit = self.max_limit;
        }
        Page::new(skip.unwrap_or(0), limit)
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("LAUNCHPAD_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::ConfigValidation {
                message: "server.port must be greater than 0".to_string(),
            });
        }

        let url = self.ingest.provider_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::ConfigValidation {
                message: format!("ingest.provider_url must be an http(s) URL, got {url:?}"),
            });
        }

        if self.ingest.timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "ingest.timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.api.max_limit > 0 && self.api.default_limit > self.api.max_limit {
            return Err(Error::ConfigValidation {
                message: format!(
                    "api.default_limit ({}) cannot be greater than api.max_limit ({})",
                    self.api.default_limit, self.api.max_limit
                ),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the socket address to bind the HTTP server to.
    ///
    /// # Errors
    ///
    /// Returns an error if `server.host` is not an IP address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|_| Error::ConfigValidation {
                message: format!("server.host {:?} is not an IP address", self.server.host),
            })
    }

    /// Get the provider timeout as a Duration.
    #[must_use]
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.ingest.timeout_secs)
    }
}
