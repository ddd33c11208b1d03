//! In-memory feed store.
//!
//! Holds the slot in process memory and keeps a log of every operation it
//! received, which makes it a convenient double for code built on
//! [`FeedStore`]. Failures can be injected per operation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::store::{CachedFeed, FeedStore};
use crate::Error;
use crate::feed::LocalFeedRecord;

/// An operation received by a store, in the order it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceivedMessage {
    DeleteCachedFeed,
    Insert(Vec<LocalFeedRecord>, DateTime<Utc>),
    Retrieve,
}

#[derive(Debug, Default)]
struct MemoryState {
    cache: Option<CachedFeed>,
    messages: Vec<ReceivedMessage>,
    deletion_failure: Option<String>,
    insertion_failure: Option<String>,
    retrieval_failure: Option<String>,
}

/// Non-durable [`FeedStore`] with an operation log.
///
/// Operations are serialized through an async mutex, which hands out access
/// in request order.
#[derive(Debug, Default)]
pub struct InMemoryFeedStore {
    state: Mutex<MemoryState>,
}

impl InMemoryFeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts out holding `cache`.
    pub fn with_cache(cache: CachedFeed) -> Self {
        Self { state: Mutex::new(MemoryState { cache: Some(cache), ..Default::default() }) }
    }

    /// Every operation received so far.
    pub async fn received_messages(&self) -> Vec<ReceivedMessage> {
        self.state.lock().await.messages.clone()
    }

    /// Current slot contents, bypassing the operation log.
    pub async fn snapshot(&self) -> Option<CachedFeed> {
        self.state.lock().await.cache.clone()
    }

    /// Make subsequent deletions fail with `message` (`None` restores success).
    pub async fn fail_deletions(&self, message: Option<&str>) {
        self.state.lock().await.deletion_failure = message.map(str::to_string);
    }

    /// Make subsequent insertions fail with `message` (`None` restores success).
    pub async fn fail_insertions(&self, message: Option<&str>) {
        self.state.lock().await.insertion_failure = message.map(str::to_string);
    }

    /// Make subsequent retrievals fail with `message` (`None` restores success).
    pub async fn fail_retrievals(&self, message: Option<&str>) {
        self.state.lock().await.retrieval_failure = message.map(str::to_string);
    }
}

#[async_trait]
impl FeedStore for InMemoryFeedStore {
    async fn delete_cached_feed(&self) -> Result<(), Error> {
        let mut state = self.state.lock().await;
        state.messages.push(ReceivedMessage::DeleteCachedFeed);

        if let Some(message) = &state.deletion_failure {
            return Err(Error::Store(message.clone()));
        }
        state.cache = None;
        Ok(())
    }

    async fn insert(&self, feed: Vec<LocalFeedRecord>, timestamp: DateTime<Utc>) -> Result<(), Error> {
        let mut state = self.state.lock().await;
        state.messages.push(ReceivedMessage::Insert(feed.clone(), timestamp));

        if let Some(message) = &state.insertion_failure {
            return Err(Error::Store(message.clone()));
        }
        state.cache = Some(CachedFeed { feed, timestamp });
        Ok(())
    }

    async fn retrieve(&self) -> Result<Option<CachedFeed>, Error> {
        let mut state = self.state.lock().await;
        state.messages.push(ReceivedMessage::Retrieve);

        if let Some(message) = &state.retrieval_failure {
            return Err(Error::Store(message.clone()));
        }
        Ok(state.cache.clone())
    }
}
