//! Unified error types for feedcache stores and use cases.
//!
//! The display strings carry a short code prefix so callers can branch on
//! the cause without matching on variants.

use tokio_rusqlite::rusqlite;

/// Errors reported by feed stores and the local use cases built on them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Reading or writing the backing file failed.
    #[error("CACHE_IO: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted content exists but cannot be decoded.
    #[error("CACHE_CORRUPT: {0}")]
    Corrupt(String),

    /// The store's worker has stopped; no further operations can run.
    #[error("CACHE_CLOSED: store worker is no longer running")]
    WorkerClosed,

    /// Store failure carrying only a message.
    #[error("CACHE_ERROR: {0}")]
    Store(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Corrupt(err.to_string())
    }
}

impl Error {
    /// Whether the failure came from undecodable persisted content.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Error::Corrupt(_))
    }
}
