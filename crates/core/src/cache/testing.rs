//! Shared test helpers: fixtures, store contract checks, and a store spy
//! whose operations stay pending until the test completes them.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::{oneshot, watch};
use url::Url;
use uuid::Uuid;

use super::memory::ReceivedMessage;
use super::store::{CachedFeed, FeedStore};
use crate::Error;
use crate::feed::{FeedRecord, LocalFeedRecord};

pub fn any_url() -> Url {
    Url::parse("https://any-url.com").unwrap()
}

pub fn unique_record() -> FeedRecord {
    FeedRecord {
        id: Uuid::new_v4(),
        description: Some("any description".to_string()),
        location: None,
        url: any_url(),
    }
}

/// Two unique records in domain and local shape.
pub fn unique_feed() -> (Vec<FeedRecord>, Vec<LocalFeedRecord>) {
    let records = vec![unique_record(), unique_record()];
    let local = records.iter().map(LocalFeedRecord::from).collect();
    (records, local)
}

pub fn seven_days_before(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(7)
}

/// Behaviour every [`FeedStore`] must show, run against an empty store.
pub async fn assert_store_contract<S: FeedStore + ?Sized>(store: &S) {
    // empty, twice
    assert_eq!(store.retrieve().await.unwrap(), None);
    assert_eq!(store.retrieve().await.unwrap(), None);

    // deleting an empty store succeeds and changes nothing
    store.delete_cached_feed().await.unwrap();
    assert_eq!(store.retrieve().await.unwrap(), None);

    // round trip, twice
    let (_, first) = unique_feed();
    let first_timestamp = Utc::now();
    store.insert(first.clone(), first_timestamp).await.unwrap();
    let expected = Some(CachedFeed { feed: first, timestamp: first_timestamp });
    assert_eq!(store.retrieve().await.unwrap(), expected);
    assert_eq!(store.retrieve().await.unwrap(), expected);

    // insert overrides
    let (_, second) = unique_feed();
    let second_timestamp = Utc::now() + Duration::seconds(5);
    store.insert(second.clone(), second_timestamp).await.unwrap();
    assert_eq!(store.retrieve().await.unwrap(), Some(CachedFeed { feed: second, timestamp: second_timestamp }));

    // delete empties
    store.delete_cached_feed().await.unwrap();
    assert_eq!(store.retrieve().await.unwrap(), None);

    // an empty feed is still a cached snapshot
    let empty_timestamp = Utc::now();
    store.insert(Vec::new(), empty_timestamp).await.unwrap();
    assert_eq!(store.retrieve().await.unwrap(), Some(CachedFeed { feed: Vec::new(), timestamp: empty_timestamp }));
    store.delete_cached_feed().await.unwrap();

    // operations issued together take effect in issue order
    let (_, last) = unique_feed();
    let last_timestamp = Utc::now();
    let (a, b, c) = tokio::join!(
        store.insert(unique_feed().1, Utc::now()),
        store.delete_cached_feed(),
        store.insert(last.clone(), last_timestamp),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();
    assert_eq!(store.retrieve().await.unwrap(), Some(CachedFeed { feed: last, timestamp: last_timestamp }));

    let (a, b) = tokio::join!(store.insert(unique_feed().1, Utc::now()), store.delete_cached_feed());
    a.unwrap();
    b.unwrap();
    assert_eq!(store.retrieve().await.unwrap(), None);
}

type Pending<T> = Vec<Option<oneshot::Sender<T>>>;

#[derive(Default)]
struct SpyState {
    messages: Vec<ReceivedMessage>,
    deletions: Pending<Result<(), Error>>,
    insertions: Pending<Result<(), Error>>,
    retrievals: Pending<Result<Option<CachedFeed>, Error>>,
}

/// Store double that records every operation and leaves it pending until
/// the test completes it by index.
pub struct FeedStoreSpy {
    state: Mutex<SpyState>,
    count: watch::Sender<usize>,
}

impl Default for FeedStoreSpy {
    fn default() -> Self {
        Self { state: Mutex::new(SpyState::default()), count: watch::channel(0).0 }
    }
}

impl FeedStoreSpy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received_messages(&self) -> Vec<ReceivedMessage> {
        self.state.lock().unwrap().messages.clone()
    }

    /// Wait until at least `count` operations have been received.
    pub async fn wait_for_messages(&self, count: usize) {
        let mut rx = self.count.subscribe();
        let _ = rx.wait_for(|received| *received >= count).await;
    }

    pub fn complete_deletion(&self, result: Result<(), Error>, index: usize) {
        let tx = self.state.lock().unwrap().deletions[index].take();
        if let Some(tx) = tx {
            let _ = tx.send(result);
        }
    }

    pub fn complete_deletion_successfully(&self, index: usize) {
        self.complete_deletion(Ok(()), index);
    }

    pub fn complete_insertion(&self, result: Result<(), Error>, index: usize) {
        let tx = self.state.lock().unwrap().insertions[index].take();
        if let Some(tx) = tx {
            let _ = tx.send(result);
        }
    }

    pub fn complete_insertion_successfully(&self, index: usize) {
        self.complete_insertion(Ok(()), index);
    }

    pub fn complete_retrieval(&self, result: Result<Option<CachedFeed>, Error>, index: usize) {
        let tx = self.state.lock().unwrap().retrievals[index].take();
        if let Some(tx) = tx {
            let _ = tx.send(result);
        }
    }

    pub fn complete_retrieval_with_empty_cache(&self, index: usize) {
        self.complete_retrieval(Ok(None), index);
    }

    pub fn complete_retrieval_with(&self, feed: Vec<LocalFeedRecord>, timestamp: DateTime<Utc>, index: usize) {
        self.complete_retrieval(Ok(Some(CachedFeed { feed, timestamp })), index);
    }

    fn record<T>(&self, message: ReceivedMessage, pending: fn(&mut SpyState) -> &mut Pending<T>) -> oneshot::Receiver<T> {
        let (tx, rx) = oneshot::channel();
        let received = {
            let mut state = self.state.lock().unwrap();
            state.messages.push(message);
            pending(&mut state).push(Some(tx));
            state.messages.len()
        };
        self.count.send_replace(received);
        rx
    }
}

#[async_trait]
impl FeedStore for FeedStoreSpy {
    async fn delete_cached_feed(&self) -> Result<(), Error> {
        let rx = self.record(ReceivedMessage::DeleteCachedFeed, |s| &mut s.deletions);
        rx.await.unwrap_or(Err(Error::WorkerClosed))
    }

    async fn insert(&self, feed: Vec<LocalFeedRecord>, timestamp: DateTime<Utc>) -> Result<(), Error> {
        let rx = self.record(ReceivedMessage::Insert(feed, timestamp), |s| &mut s.insertions);
        rx.await.unwrap_or(Err(Error::WorkerClosed))
    }

    async fn retrieve(&self) -> Result<Option<CachedFeed>, Error> {
        let rx = self.record(ReceivedMessage::Retrieve, |s| &mut s.retrievals);
        rx.await.unwrap_or(Err(Error::WorkerClosed))
    }
}
