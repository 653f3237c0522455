//! Event envelope wrapping all published messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EventError;

/// Standard envelope for every message on the bus.
///
/// Subscribers receive the serialized envelope bytes, so redelivery detection
/// and audit can key on `id` without knowledge of the payload shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique identifier for this event instance.
    pub id: Uuid,

    /// Topic the event was published on, e.g. "variants.created".
    pub topic: String,

    /// Timestamp at publish time.
    pub timestamp: DateTime<Utc>,

    /// The event payload.
    pub payload: serde_json::Value,
}

impl EventEnvelope {
    /// Wrap a payload for a topic.
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: topic.into(),
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, EventError> {
        serde_json::to_vec(self).map_err(|e| EventError::SerializationFailed {
            topic: self.topic.clone(),
            cause: e.to_string(),
        })
    }

    /// Deserialize from JSON bytes.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, EventError> {
        serde_json::from_slice(bytes).map_err(|e| EventError::InvalidEnvelope {
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_creation() {
        let envelope =
            EventEnvelope::new("variants.created", serde_json::json!({"n": 1}));

        assert_eq!(envelope.topic, "variants.created");
        assert_eq!(envelope.payload["n"], 1);
    }

    #[test]
    fn envelope_serialization_roundtrip() {
        let envelope = EventEnvelope::new(
            "products.updated",
            serde_json::json!({"product_id": "abc"}),
        );

        let bytes = envelope.to_json_bytes().unwrap();
        let restored = EventEnvelope::from_json_bytes(&bytes).unwrap();

        assert_eq!(envelope.id, restored.id);
        assert_eq!(envelope.topic, restored.topic);
        assert_eq!(envelope.payload, restored.payload);
    }

    #[test]
    fn invalid_bytes_rejected() {
        assert!(EventEnvelope::from_json_bytes(b"not json").is_err());
        assert!(EventEnvelope::from_json_bytes(b"{}").is_err());
    }
}
