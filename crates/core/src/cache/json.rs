//! Flat-file JSON feed store.
//!
//! The slot is one JSON document at a caller-chosen path:
//!
//! ```json
//! {"feed": [{"id": "...", "description": null, "location": null, "url": "..."}],
//!  "timestamp": "2024-05-01T09:30:00Z"}
//! ```
//!
//! All file access happens on one dedicated thread that takes jobs from a
//! channel, so operations run in submission order and never overlap. Writes
//! go to a `.tmp` sibling first and are renamed over the target.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use url::Url;
use uuid::Uuid;

use super::store::{CachedFeed, FeedStore};
use crate::Error;
use crate::feed::LocalFeedRecord;

type Job = Box<dyn FnOnce(&Path) + Send>;

#[derive(Serialize, Deserialize)]
struct StoredCache {
    feed: Vec<StoredRecord>,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
struct StoredRecord {
    id: Uuid,
    description: Option<String>,
    location: Option<String>,
    url: Url,
}

impl From<&LocalFeedRecord> for StoredRecord {
    fn from(record: &LocalFeedRecord) -> Self {
        Self {
            id: record.id,
            description: record.description.clone(),
            location: record.location.clone(),
            url: record.url.clone(),
        }
    }
}

impl From<StoredRecord> for LocalFeedRecord {
    fn from(record: StoredRecord) -> Self {
        Self { id: record.id, description: record.description, location: record.location, url: record.url }
    }
}

/// [`FeedStore`] persisting the slot as a JSON file.
#[derive(Debug)]
pub struct JsonFileFeedStore {
    path: PathBuf,
    jobs: mpsc::Sender<Job>,
}

impl JsonFileFeedStore {
    /// Create a store for the file at `path` and start its worker thread.
    ///
    /// Nothing is read or written until the first operation. The parent
    /// directory must exist by then.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let (jobs, queue) = mpsc::channel::<Job>();
        let worker_path = path.clone();

        std::thread::Builder::new().name("feedcache-json-store".into()).spawn(move || {
            for job in queue {
                job(&worker_path);
            }
            tracing::trace!(path = %worker_path.display(), "json store worker stopped");
        })?;

        tracing::debug!(path = %path.display(), "opened json feed store");
        Ok(Self { path, jobs })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `op` on the worker thread and wait for its result.
    async fn submit<T, F>(&self, op: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T, Error> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::new(move |path: &Path| {
            let _ = tx.send(op(path));
        });
        self.jobs.send(job).map_err(|_| Error::WorkerClosed)?;
        rx.await.map_err(|_| Error::WorkerClosed)?
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn read_cache(path: &Path) -> Result<Option<CachedFeed>, Error> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let stored: StoredCache = serde_json::from_slice(&bytes)?;
    Ok(Some(CachedFeed {
        feed: stored.feed.into_iter().map(LocalFeedRecord::from).collect(),
        timestamp: stored.timestamp,
    }))
}

fn write_cache(path: &Path, feed: &[LocalFeedRecord], timestamp: DateTime<Utc>) -> Result<(), Error> {
    let stored = StoredCache { feed: feed.iter().map(StoredRecord::from).collect(), timestamp };
    let bytes = serde_json::to_vec(&stored).map_err(|e| Error::Store(format!("failed to encode feed: {e}")))?;

    let tmp = temp_path(path);
    std::fs::write(&tmp, bytes)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

fn remove_cache(path: &Path) -> Result<(), Error> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl FeedStore for JsonFileFeedStore {
    async fn delete_cached_feed(&self) -> Result<(), Error> {
        self.submit(remove_cache).await
    }

    async fn insert(&self, feed: Vec<LocalFeedRecord>, timestamp: DateTime<Utc>) -> Result<(), Error> {
        self.submit(move |path| write_cache(path, &feed, timestamp)).await
    }

    async fn retrieve(&self) -> Result<Option<CachedFeed>, Error> {
        self.submit(read_cache).await
    }
}
