//! Local feed use cases: load, save and validate on top of a [`FeedStore`].
//!
//! ### Load
//! Retrieve the slot and return its records while they are fresh. Empty and
//! stale slots both read as an empty feed. Retrieval errors are returned
//! untouched, and load never modifies the store.
//!
//! ### Save
//! Delete, then insert with the current date. A failed delete is returned
//! without attempting the insert.
//!
//! ### Validate
//! Retrieve, then delete the slot if it cannot be read or has gone stale.
//! Errors are traced and otherwise dropped.
//!
//! Each use case also has a callback form (`spawn_*`) returning a
//! [`TaskHandle`]. The spawned work never holds the loader itself; once the
//! loader is dropped, pending work stops at its next suspension point and
//! its completion is not delivered.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::policy::FeedCachePolicy;
use super::store::FeedStore;
use crate::Error;
use crate::feed::{FeedRecord, LocalFeedRecord};
use crate::lifetime::{Lifetime, TaskHandle, spawn_guarded};

/// Source of "now" used to stamp and age cached feeds.
pub type CurrentDate = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Load, save and validate the locally cached feed.
pub struct LocalFeedLoader<S: ?Sized> {
    store: Arc<S>,
    current_date: CurrentDate,
    policy: FeedCachePolicy,
    lifetime: Lifetime,
}

impl<S> LocalFeedLoader<S>
where
    S: FeedStore + ?Sized + 'static,
{
    /// Create a loader over `store`, reading the time from `current_date`.
    pub fn new(store: Arc<S>, current_date: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self { store, current_date: Arc::new(current_date), policy: FeedCachePolicy::default(), lifetime: Lifetime::new() }
    }

    /// Replace the default seven-day policy.
    pub fn with_policy(mut self, policy: FeedCachePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> FeedCachePolicy {
        self.policy
    }

    /// Records from a fresh cache, or an empty feed when nothing fresh is cached.
    pub async fn load(&self) -> Result<Vec<FeedRecord>, Error> {
        self.use_cases().load().await
    }

    /// Replace the cached feed with `feed`, stamped with the current date.
    pub async fn save(&self, feed: &[FeedRecord]) -> Result<(), Error> {
        self.use_cases().save(feed.iter().map(LocalFeedRecord::from).collect()).await
    }

    /// Delete the cached feed if it is unreadable or stale.
    pub async fn validate_cache(&self) {
        self.use_cases().validate().await
    }

    /// Callback form of [`load`](Self::load).
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn spawn_load<C>(&self, completion: C) -> TaskHandle
    where
        C: FnOnce(Result<Vec<FeedRecord>, Error>) + Send + 'static,
    {
        let use_cases = self.use_cases();
        spawn_guarded(self.lifetime.liveness(), async move { use_cases.load().await }, completion)
    }

    /// Callback form of [`save`](Self::save).
    ///
    /// If the loader is dropped while the delete is pending, the insert is
    /// never issued.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn spawn_save<C>(&self, feed: Vec<FeedRecord>, completion: C) -> TaskHandle
    where
        C: FnOnce(Result<(), Error>) + Send + 'static,
    {
        let use_cases = self.use_cases();
        let local = feed.into_iter().map(LocalFeedRecord::from).collect();
        spawn_guarded(self.lifetime.liveness(), async move { use_cases.save(local).await }, completion)
    }

    /// Fire-and-forget form of [`validate_cache`](Self::validate_cache).
    ///
    /// If the loader is dropped while the retrieval is pending, nothing is deleted.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn spawn_validate_cache(&self) -> TaskHandle {
        let use_cases = self.use_cases();
        spawn_guarded(self.lifetime.liveness(), async move { use_cases.validate().await }, |()| {})
    }

    fn use_cases(&self) -> UseCases<S> {
        UseCases { store: Arc::clone(&self.store), current_date: Arc::clone(&self.current_date), policy: self.policy }
    }
}

/// What the use cases need, detached from the loader that owns them.
struct UseCases<S: ?Sized> {
    store: Arc<S>,
    current_date: CurrentDate,
    policy: FeedCachePolicy,
}

impl<S: FeedStore + ?Sized> UseCases<S> {
    fn now(&self) -> DateTime<Utc> {
        (self.current_date)()
    }

    async fn load(&self) -> Result<Vec<FeedRecord>, Error> {
        match self.store.retrieve().await? {
            Some(cache) if self.policy.validate(cache.timestamp, self.now()) => {
                Ok(cache.feed.into_iter().map(FeedRecord::from).collect())
            }
            Some(_) | None => Ok(Vec::new()),
        }
    }

    async fn save(&self, feed: Vec<LocalFeedRecord>) -> Result<(), Error> {
        self.store.delete_cached_feed().await?;
        self.store.insert(feed, self.now()).await
    }

    async fn validate(&self) {
        match self.store.retrieve().await {
            Err(error) => {
                tracing::debug!(%error, "cached feed unreadable; deleting");
                self.delete_quietly().await;
            }
            Ok(Some(cache)) if !self.policy.validate(cache.timestamp, self.now()) => {
                tracing::debug!(timestamp = %cache.timestamp, "cached feed expired; deleting");
                self.delete_quietly().await;
            }
            Ok(_) => {}
        }
    }

    async fn delete_quietly(&self) {
        if let Err(error) = self.store.delete_cached_feed().await {
            tracing::debug!(%error, "failed to delete cached feed during validation");
        }
    }
}
