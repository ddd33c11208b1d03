//! Remote side of feedcache.
//!
//! This crate provides the HTTP transport seam, a reqwest-backed client, and
//! the remote feed loader with its response mapper.

pub mod fetch;
pub mod http;
pub mod remote;

#[cfg(test)]
pub(crate) mod testing;

pub use fetch::{FetchConfig, ReqwestHttpClient};
pub use http::{HttpClient, HttpClientError, HttpResponse};
pub use remote::{RemoteFeedItem, RemoteFeedLoader, RemoteLoadError};
