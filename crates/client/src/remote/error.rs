//! Remote feed loader error types.

/// Why a remote load failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RemoteLoadError {
    /// The request never produced a response.
    #[error("connectivity error: no response from feed endpoint")]
    Connectivity,

    /// A response arrived but did not carry a valid feed.
    #[error("invalid data: response is not a valid feed")]
    InvalidData,
}
