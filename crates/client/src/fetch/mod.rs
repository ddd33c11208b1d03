//! reqwest-backed [`HttpClient`].
//!
//! ### Limits
//! - Request timeout: 20s (configurable)
//! - Max redirects: 5
//! - Max body bytes: 5MB (configurable), checked against Content-Length
//!   before the body is read and against the body afterwards
//!
//! Non-2xx statuses are returned as responses, not errors.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, header};
use url::Url;

use feedcache_core::config::AppConfig;

use crate::http::{HttpClient, HttpClientError, HttpResponse};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "feedcache/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "feedcache/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

/// HTTP client with size and time limits.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    http: Client,
    config: FetchConfig,
}

impl ReqwestHttpClient {
    /// Create a new client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, HttpClientError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| HttpClientError::Build(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn check_size(&self, size: u64) -> Result<(), HttpClientError> {
        if size > self.config.max_bytes as u64 {
            return Err(HttpClientError::TooLarge { size, limit: self.config.max_bytes });
        }
        Ok(())
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &Url) -> Result<HttpResponse, HttpClientError> {
        let start = Instant::now();

        let response = self
            .http
            .get(url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();

        if let Some(len) = response.content_length() {
            self.check_size(len)?;
        }

        let body = response.bytes().await?;
        self.check_size(body.len() as u64)?;

        tracing::debug!(
            %url,
            status = status.as_u16(),
            bytes = body.len(),
            fetch_ms = start.elapsed().as_millis() as u64,
            "fetched feed"
        );

        Ok(HttpResponse { status: status.as_u16(), body })
    }
}
