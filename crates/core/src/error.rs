// Central Error Type for the Queue

use thiserror::Error;

/// Queue-level error type.
///
/// Storage hiccups are deliberately NOT represented here at the public
/// surface: the Durable Store port absorbs them (logged, benign default).
/// What remains are the few failures a caller can actually act on.
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("queue is shut down")]
    ChannelClosed,

    #[error("invalid queue name: {0}")]
    InvalidQueueName(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using QueueError
pub type Result<T> = std::result::Result<T, QueueError>;

// From implementation for infra crates (to avoid circular dependency)
impl From<String> for QueueError {
    fn from(err: String) -> Self {
        QueueError::Storage(err)
    }
}
