//! Batcher errors.

use thiserror::Error;

/// Failure while framing or compressing a batch.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("compression error: {0}")]
    Compression(#[from] std::io::Error),

    #[error("batch channel closed")]
    ChannelClosed,
}
