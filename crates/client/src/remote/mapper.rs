//! Feed endpoint response mapping.
//!
//! A response is a feed only when the status is 200 and the body decodes as
//! `{"items": [...]}`. Each item needs an `id` (UUID) and an `image` (URL);
//! `description` and `location` may be missing or null. One bad item fails
//! the whole payload.

use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use feedcache_core::FeedRecord;

use super::error::RemoteLoadError;

const OK_200: u16 = 200;

/// One feed item as served by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteFeedItem {
    pub id: Uuid,
    pub description: Option<String>,
    pub location: Option<String>,
    pub image: Url,
}

impl From<RemoteFeedItem> for FeedRecord {
    fn from(item: RemoteFeedItem) -> Self {
        Self { id: item.id, description: item.description, location: item.location, url: item.image }
    }
}

#[derive(Deserialize)]
struct Root {
    items: Vec<RemoteFeedItem>,
}

/// Decode a feed endpoint response.
///
/// # Errors
///
/// Returns [`RemoteLoadError::InvalidData`] for any status other than 200 and
/// for bodies that do not decode.
pub fn map(data: &[u8], status: u16) -> Result<Vec<RemoteFeedItem>, RemoteLoadError> {
    if status != OK_200 {
        tracing::debug!(status, "feed response has unexpected status");
        return Err(RemoteLoadError::InvalidData);
    }

    match serde_json::from_slice::<Root>(data) {
        Ok(root) => Ok(root.items),
        Err(error) => {
            tracing::debug!(%error, bytes = data.len(), "feed response did not decode");
            Err(RemoteLoadError::InvalidData)
        }
    }
}
