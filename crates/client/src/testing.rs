//! Test double for [`HttpClient`] whose requests stay pending until the test
//! completes them by index.

use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::{oneshot, watch};
use url::Url;

use crate::http::{HttpClient, HttpClientError, HttpResponse};

type Completion = oneshot::Sender<Result<HttpResponse, HttpClientError>>;

pub struct HttpClientSpy {
    requests: Mutex<Vec<(Url, Option<Completion>)>>,
    count: watch::Sender<usize>,
}

impl Default for HttpClientSpy {
    fn default() -> Self {
        Self { requests: Mutex::new(Vec::new()), count: watch::channel(0).0 }
    }
}

impl HttpClientSpy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requested_urls(&self) -> Vec<Url> {
        self.requests.lock().unwrap().iter().map(|(url, _)| url.clone()).collect()
    }

    /// Wait until at least `count` requests have been issued.
    pub async fn wait_for_requests(&self, count: usize) {
        let mut rx = self.count.subscribe();
        let _ = rx.wait_for(|issued| *issued >= count).await;
    }

    pub fn complete_with_error(&self, error: HttpClientError, index: usize) {
        self.complete(Err(error), index);
    }

    pub fn complete_with_status(&self, status: u16, body: impl Into<Bytes>, index: usize) {
        self.complete(Ok(HttpResponse { status, body: body.into() }), index);
    }

    fn complete(&self, result: Result<HttpResponse, HttpClientError>, index: usize) {
        let tx = self.requests.lock().unwrap()[index].1.take();
        if let Some(tx) = tx {
            let _ = tx.send(result);
        }
    }
}

#[async_trait]
impl HttpClient for HttpClientSpy {
    async fn get(&self, url: &Url) -> Result<HttpResponse, HttpClientError> {
        let (tx, rx) = oneshot::channel();
        let issued = {
            let mut requests = self.requests.lock().unwrap();
            requests.push((url.clone(), Some(tx)));
            requests.len()
        };
        self.count.send_replace(issued);
        rx.await.unwrap_or_else(|_| Err(HttpClientError::Network("request dropped".into())))
    }
}
