//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (FEEDCACHE_*)
//! 2. TOML config file (if FEEDCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cache::FeedCachePolicy;
use crate::cache::policy::DEFAULT_MAX_AGE_DAYS;

mod validation;

pub use validation::ConfigError;

/// Which [`FeedStore`](crate::FeedStore) backend to open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Json,
    Memory,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (FEEDCACHE_*)
/// 2. TOML config file (if FEEDCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote feed endpoint.
    ///
    /// Set via FEEDCACHE_FEED_URL environment variable.
    /// Required only when the remote loader is built.
    #[serde(default)]
    pub feed_url: Option<Url>,

    /// Store backend: `sqlite`, `json` or `memory`.
    ///
    /// Set via FEEDCACHE_STORE_BACKEND environment variable.
    #[serde(default)]
    pub store_backend: StoreBackend,

    /// Location of the store file. Ignored by the memory backend.
    ///
    /// Set via FEEDCACHE_STORE_PATH environment variable.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Days a saved feed stays fresh.
    ///
    /// Set via FEEDCACHE_MAX_CACHE_AGE_DAYS environment variable.
    #[serde(default = "default_max_cache_age_days")]
    pub max_cache_age_days: u32,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via FEEDCACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via FEEDCACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum response body size in bytes.
    ///
    /// Set via FEEDCACHE_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./feedcache.sqlite")
}

fn default_max_cache_age_days() -> u32 {
    DEFAULT_MAX_AGE_DAYS as u32
}

fn default_user_agent() -> String {
    "feedcache/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed_url: None,
            store_backend: StoreBackend::default(),
            store_path: default_store_path(),
            max_cache_age_days: default_max_cache_age_days(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Freshness policy for the configured maximum cache age.
    pub fn cache_policy(&self) -> FeedCachePolicy {
        FeedCachePolicy::new(chrono::Duration::days(i64::from(self.max_cache_age_days)))
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `FEEDCACHE_`
    /// 2. TOML file from `FEEDCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("FEEDCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("FEEDCACHE_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Feed URL for the remote loader (deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no feed URL is configured.
    pub fn require_feed_url(&self) -> Result<&Url, ConfigError> {
        self.feed_url.as_ref().ok_or_else(|| ConfigError::Missing {
            field: "feed_url".into(),
            hint: "Set FEEDCACHE_FEED_URL environment variable".into(),
        })
    }
}
