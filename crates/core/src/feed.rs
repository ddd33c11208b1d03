//! Feed records.
//!
//! [`FeedRecord`] is what callers see. [`LocalFeedRecord`] is what stores
//! persist. The two are kept as separate types so the storage schema can
//! change without touching callers (and the other way round); conversion is
//! lossless in both directions.

use url::Url;
use uuid::Uuid;

/// A single feed entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedRecord {
    pub id: Uuid,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Image location.
    pub url: Url,
}

/// Persistence shape of a [`FeedRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalFeedRecord {
    pub id: Uuid,
    pub description: Option<String>,
    pub location: Option<String>,
    pub url: Url,
}

impl From<FeedRecord> for LocalFeedRecord {
    fn from(record: FeedRecord) -> Self {
        Self { id: record.id, description: record.description, location: record.location, url: record.url }
    }
}

impl From<&FeedRecord> for LocalFeedRecord {
    fn from(record: &FeedRecord) -> Self {
        Self::from(record.clone())
    }
}

impl From<LocalFeedRecord> for FeedRecord {
    fn from(local: LocalFeedRecord) -> Self {
        Self { id: local.id, description: local.description, location: local.location, url: local.url }
    }
}
