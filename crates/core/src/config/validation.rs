//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::{AppConfig, StoreBackend};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_cache_age_days` is 0 or exceeds 365
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - `store_path` is empty for a file-backed store
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_cache_age_days == 0 {
            return Err(ConfigError::Invalid {
                field: "max_cache_age_days".into(),
                reason: "must be at least 1 day".into(),
            });
        }
        if self.max_cache_age_days > 365 {
            return Err(ConfigError::Invalid {
                field: "max_cache_age_days".into(),
                reason: "must not exceed 365 days".into(),
            });
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.store_backend != StoreBackend::Memory && self.store_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "store_path".into(),
                reason: "must not be empty for file-backed stores".into(),
            });
        }

        if self.store_backend == StoreBackend::Memory && self.store_path != super::default_store_path() {
            tracing::warn!(
                store_path = %self.store_path.display(),
                "store_path is set but the memory backend never touches disk"
            );
        }

        Ok(())
    }
}
