//! Remote feed loading.
//!
//! [`RemoteFeedLoader`] issues one GET to its URL per load and maps the
//! response with [`mapper::map`]:
//!
//! - no response at all ⇒ [`RemoteLoadError::Connectivity`]
//! - a response that is not a valid feed ⇒ [`RemoteLoadError::InvalidData`]
//! - otherwise the items, in source order, as [`FeedRecord`]s
//!
//! There are no retries and no partial results.

pub mod error;
pub mod mapper;

pub use error::RemoteLoadError;
pub use mapper::RemoteFeedItem;

use std::sync::Arc;

use feedcache_core::{FeedRecord, Lifetime, TaskHandle, spawn_guarded};
use url::Url;

use crate::http::HttpClient;

/// Loads the feed from a remote endpoint through an [`HttpClient`].
pub struct RemoteFeedLoader<C: ?Sized> {
    url: Url,
    client: Arc<C>,
    lifetime: Lifetime,
}

impl<C> RemoteFeedLoader<C>
where
    C: HttpClient + ?Sized + 'static,
{
    pub fn new(url: Url, client: Arc<C>) -> Self {
        Self { url, client, lifetime: Lifetime::new() }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch and decode the feed.
    pub async fn load(&self) -> Result<Vec<FeedRecord>, RemoteLoadError> {
        load_feed(&*self.client, &self.url).await
    }

    /// Callback form of [`load`](Self::load).
    ///
    /// The spawned work holds the client and URL but not the loader. If the
    /// loader is dropped before the response arrives, `completion` is never
    /// called.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn spawn_load<F>(&self, completion: F) -> TaskHandle
    where
        F: FnOnce(Result<Vec<FeedRecord>, RemoteLoadError>) + Send + 'static,
    {
        let client = Arc::clone(&self.client);
        let url = self.url.clone();
        spawn_guarded(self.lifetime.liveness(), async move { load_feed(&*client, &url).await }, completion)
    }
}

async fn load_feed<C: HttpClient + ?Sized>(client: &C, url: &Url) -> Result<Vec<FeedRecord>, RemoteLoadError> {
    let response = client.get(url).await.map_err(|error| {
        tracing::debug!(%url, %error, "feed request failed");
        RemoteLoadError::Connectivity
    })?;

    let items = mapper::map(&response.body, response.status)?;
    tracing::debug!(%url, items = items.len(), "loaded remote feed");

    Ok(items.into_iter().map(FeedRecord::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpClientError;
    use crate::testing::HttpClientSpy;
    use serde_json::json;
    use tokio::sync::oneshot;
    use uuid::Uuid;

    type LoadResult = Result<Vec<FeedRecord>, RemoteLoadError>;

    fn any_url() -> Url {
        Url::parse("https://a-given-url.com/feed").unwrap()
    }

    fn make_sut(url: Url) -> (RemoteFeedLoader<HttpClientSpy>, Arc<HttpClientSpy>) {
        let client = Arc::new(HttpClientSpy::new());
        (RemoteFeedLoader::new(url, Arc::clone(&client)), client)
    }

    fn start_load(loader: &RemoteFeedLoader<HttpClientSpy>) -> oneshot::Receiver<LoadResult> {
        let (tx, rx) = oneshot::channel();
        loader.spawn_load(move |result| {
            let _ = tx.send(result);
        });
        rx
    }

    fn make_item(description: Option<&str>, location: Option<&str>, image: &str) -> (FeedRecord, serde_json::Value) {
        let record = FeedRecord {
            id: Uuid::new_v4(),
            description: description.map(str::to_string),
            location: location.map(str::to_string),
            url: Url::parse(image).unwrap(),
        };
        let json = json!({
            "id": record.id.to_string(),
            "description": description,
            "location": location,
            "image": image,
        });
        (record, json)
    }

    fn items_body(items: &[serde_json::Value]) -> Vec<u8> {
        serde_json::to_vec(&json!({ "items": items })).unwrap()
    }

    #[tokio::test]
    async fn test_new_does_not_request_data() {
        let (_loader, client) = make_sut(any_url());
        assert!(client.requested_urls().is_empty());
    }

    #[tokio::test]
    async fn test_load_requests_data_from_url() {
        let url = Url::parse("https://a-given-url.com/v1/feed").unwrap();
        let (loader, client) = make_sut(url.clone());

        let _rx = start_load(&loader);
        client.wait_for_requests(1).await;

        assert_eq!(client.requested_urls(), vec![url]);
    }

    #[tokio::test]
    async fn test_load_twice_requests_data_twice() {
        let url = any_url();
        let (loader, client) = make_sut(url.clone());

        let _first = start_load(&loader);
        let _second = start_load(&loader);
        client.wait_for_requests(2).await;

        assert_eq!(client.requested_urls(), vec![url.clone(), url]);
    }

    #[tokio::test]
    async fn test_load_delivers_connectivity_error_on_client_error() {
        let (loader, client) = make_sut(any_url());

        let rx = start_load(&loader);
        client.wait_for_requests(1).await;
        client.complete_with_error(HttpClientError::Timeout, 0);

        assert_eq!(rx.await.unwrap(), Err(RemoteLoadError::Connectivity));
    }

    #[tokio::test]
    async fn test_load_delivers_invalid_data_on_non_200_response() {
        let (loader, client) = make_sut(any_url());
        let statuses = [199, 201, 300, 400, 500];

        let receivers: Vec<_> = statuses.iter().map(|_| start_load(&loader)).collect();
        client.wait_for_requests(statuses.len()).await;
        for (index, status) in statuses.iter().enumerate() {
            client.complete_with_status(*status, items_body(&[]), index);
        }

        for rx in receivers {
            assert_eq!(rx.await.unwrap(), Err(RemoteLoadError::InvalidData));
        }
    }

    #[tokio::test]
    async fn test_load_delivers_invalid_data_on_200_with_invalid_json() {
        let (loader, client) = make_sut(any_url());

        let rx = start_load(&loader);
        client.wait_for_requests(1).await;
        client.complete_with_status(200, &b"invalid json"[..], 0);

        assert_eq!(rx.await.unwrap(), Err(RemoteLoadError::InvalidData));
    }

    #[tokio::test]
    async fn test_load_delivers_no_items_on_200_with_empty_list() {
        let (loader, client) = make_sut(any_url());

        let rx = start_load(&loader);
        client.wait_for_requests(1).await;
        client.complete_with_status(200, items_body(&[]), 0);

        assert_eq!(rx.await.unwrap(), Ok(vec![]));
    }

    #[tokio::test]
    async fn test_load_delivers_items_on_200_with_items() {
        let (loader, client) = make_sut(any_url());
        let (first, first_json) = make_item(None, None, "http://a-url.com/");
        let (second, second_json) =
            make_item(Some("a description"), Some("a location"), "http://another-url.com/");

        let rx = start_load(&loader);
        client.wait_for_requests(1).await;
        client.complete_with_status(200, items_body(&[first_json, second_json]), 0);

        assert_eq!(rx.await.unwrap(), Ok(vec![first, second]));
    }

    #[tokio::test]
    async fn test_load_does_not_deliver_result_after_loader_is_dropped() {
        let (loader, client) = make_sut(any_url());

        let rx = start_load(&loader);
        client.wait_for_requests(1).await;
        drop(loader);
        client.complete_with_status(200, items_body(&[]), 0);

        assert!(rx.await.is_err(), "no completion after the loader is released");
    }

    #[tokio::test]
    async fn test_cancelled_load_does_not_deliver_result() {
        let (loader, client) = make_sut(any_url());
        let (tx, rx) = oneshot::channel::<LoadResult>();

        let handle = loader.spawn_load(move |result| {
            let _ = tx.send(result);
        });
        client.wait_for_requests(1).await;
        handle.cancel();
        client.complete_with_status(200, items_body(&[]), 0);

        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn test_async_load_maps_response() {
        let (loader, client) = make_sut(any_url());
        let (record, json) = make_item(Some("d"), None, "http://a-url.com/");

        let (result, ()) = tokio::join!(loader.load(), async {
            client.wait_for_requests(1).await;
            client.complete_with_status(200, items_body(&[json]), 0);
        });

        assert_eq!(result, Ok(vec![record]));
    }
}
