//! Error types for the live module.

use thiserror::Error;

/// Errors raised by the push channel.
///
/// All of these are recoverable: the portal keeps working without
/// real-time updates.
#[derive(Debug, Error)]
pub enum LiveError {
    /// The channel could not be opened.
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    /// The remote side closed or lost the channel.
    #[error("transport dropped: {0}")]
    TransportDropped(String),

    /// Operation needs an open channel.
    #[error("not connected")]
    NotConnected,

    /// Frame could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Result type for live operations.
pub type Result<T> = std::result::Result<T, LiveError>;
