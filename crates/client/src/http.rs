//! HTTP transport seam used by the remote feed loader.

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

/// Status and body of a completed HTTP exchange.
///
/// Any status counts as a completed exchange; interpreting it is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

/// Errors from the HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HttpClientError {
    /// The underlying client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(String),

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(String),

    /// Response body exceeds the configured limit.
    #[error("response too large: {size} bytes exceeds {limit}")]
    TooLarge { size: u64, limit: usize },
}

impl From<reqwest::Error> for HttpClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { HttpClientError::Timeout } else { HttpClientError::Network(err.to_string()) }
    }
}

/// Issues GET requests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &Url) -> Result<HttpResponse, HttpClientError>;
}
