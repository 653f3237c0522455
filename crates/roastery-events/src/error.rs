//! Error types for the event bus.

use thiserror::Error;

/// Event bus error variants.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Failed to serialize event for topic '{topic}': {cause}")]
    SerializationFailed { topic: String, cause: String },

    #[error("Invalid event envelope: {reason}")]
    InvalidEnvelope { reason: String },

    #[error("Failed to connect to message broker at {url}: {cause}")]
    ConnectionFailed { url: String, cause: String },

    #[error("Failed to publish to stream subject '{subject}': {cause}")]
    StreamPublishFailed { subject: String, cause: String },

    #[error("Durable stream is not configured")]
    StreamUnavailable,

    #[error("Event bus is closed")]
    Closed,
}

impl EventError {
    /// Short machine-readable kind for the error metric label.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            EventError::SerializationFailed { .. } => "serialization",
            EventError::InvalidEnvelope { .. } => "envelope",
            EventError::ConnectionFailed { .. } => "connection",
            EventError::StreamPublishFailed { .. } => "stream_publish",
            EventError::StreamUnavailable => "stream_unavailable",
            EventError::Closed => "closed",
        }
    }
}
