//! The single-slot feed store contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::Error;
use crate::feed::LocalFeedRecord;

/// The last successfully saved snapshot of the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedFeed {
    pub feed: Vec<LocalFeedRecord>,
    pub timestamp: DateTime<Utc>,
}

/// Durable storage holding at most one [`CachedFeed`].
///
/// Implementations run their operations one at a time, in the order they
/// were submitted, so a delete followed by an insert from one caller is never
/// split by another operation on the same store.
#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Remove the cached feed. Succeeds when nothing is cached.
    async fn delete_cached_feed(&self) -> Result<(), Error>;

    /// Replace the slot with `feed` stamped at `timestamp`.
    ///
    /// On failure the slot holds its previous contents or nothing; never a
    /// partially written feed.
    async fn insert(&self, feed: Vec<LocalFeedRecord>, timestamp: DateTime<Utc>) -> Result<(), Error>;

    /// Read the slot without side effects. `Ok(None)` means nothing is cached.
    async fn retrieve(&self) -> Result<Option<CachedFeed>, Error>;
}
