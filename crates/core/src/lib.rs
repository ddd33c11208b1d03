//! Core types and shared functionality for feedcache.
//!
//! This crate provides:
//! - Feed records and their persistence-shaped counterparts
//! - The single-slot `FeedStore` contract with SQLite, JSON-file and in-memory backends
//! - `LocalFeedLoader` use cases (load, save, validate) and the cache age policy
//! - Owner lifetimes and task handles for callback-style operations
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod feed;
pub mod lifetime;

pub use cache::{CachedFeed, FeedCachePolicy, FeedStore, LocalFeedLoader};
pub use error::Error;
pub use feed::{FeedRecord, LocalFeedRecord};
pub use lifetime::{Lifetime, Liveness, TaskHandle, spawn_guarded};
