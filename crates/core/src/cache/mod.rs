//! Single-slot feed cache.
//!
//! This module provides the [`FeedStore`] contract, its backends and the
//! local use cases built on it:
//!
//! - SQLite store with automatic schema migrations (tokio-rusqlite)
//! - JSON file store with a dedicated worker thread
//! - In-memory store with an operation log and failure injection
//! - Seven-day freshness policy and [`LocalFeedLoader`]

pub mod connection;
pub mod json;
pub mod local_loader;
pub mod memory;
pub mod migrations;
pub mod policy;
pub mod records;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

pub use crate::Error;

pub use connection::SqliteFeedStore;
pub use json::JsonFileFeedStore;
pub use local_loader::{CurrentDate, LocalFeedLoader};
pub use memory::{InMemoryFeedStore, ReceivedMessage};
pub use policy::FeedCachePolicy;
pub use store::{CachedFeed, FeedStore};

use crate::config::{AppConfig, StoreBackend};

/// Open the store backend selected by `config`.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn FeedStore>, Error> {
    tracing::debug!(backend = ?config.store_backend, path = %config.store_path.display(), "opening feed store");

    match config.store_backend {
        StoreBackend::Sqlite => Ok(Arc::new(SqliteFeedStore::open(&config.store_path).await?)),
        StoreBackend::Json => {
            if let Some(parent) = config.store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            Ok(Arc::new(JsonFileFeedStore::new(config.store_path.clone())?))
        }
        StoreBackend::Memory => Ok(Arc::new(InMemoryFeedStore::new())),
    }
}
