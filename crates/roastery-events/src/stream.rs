//! Durable event stream backed by NATS JetStream.
//!
//! Persistent topics are appended to a single file-backed stream named
//! `events` with one subject per topic (`events.<topic>`). Retention is
//! limits-based with a 30-day maximum age; consumers are expected to be
//! idempotent since delivery is at-least-once.

use async_nats::jetstream::{
    self,
    stream::{Config as StreamConfig, RetentionPolicy, StorageType},
    Context,
};
use std::time::Duration;

use crate::error::EventError;

/// Name of the JetStream stream holding all durable topics.
pub const STREAM_NAME: &str = "events";

/// Subject prefix for durable topics.
pub const SUBJECT_PREFIX: &str = "events";

/// Retention window for the durable stream.
pub const MAX_AGE: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Handle to the durable `events` stream.
#[derive(Clone)]
pub struct PersistentStream {
    jetstream: Context,
}

impl PersistentStream {
    /// Connect to NATS and get or create the `events` stream.
    pub async fn connect(url: &str) -> Result<Self, EventError> {
        let client = async_nats::connect(url).await.map_err(|e| {
            EventError::ConnectionFailed {
                url: url.to_string(),
                cause: e.to_string(),
            }
        })?;

        let jetstream = jetstream::new(client);

        jetstream
            .get_or_create_stream(StreamConfig {
                name: STREAM_NAME.to_string(),
                subjects: vec![format!("{SUBJECT_PREFIX}.>")],
                storage: StorageType::File,
                retention: RetentionPolicy::Limits,
                max_age: MAX_AGE,
                ..Default::default()
            })
            .await
            .map_err(|e| EventError::ConnectionFailed {
                url: url.to_string(),
                cause: e.to_string(),
            })?;

        tracing::info!(url = %url, stream = STREAM_NAME, "Durable event stream ready");

        Ok(Self { jetstream })
    }

    /// Subject a topic maps to, e.g. `events.variants.created`.
    #[must_use]
    pub fn subject_for(topic: &str) -> String {
        format!("{SUBJECT_PREFIX}.{topic}")
    }

    /// Append envelope bytes for a topic and wait for the broker ack.
    pub async fn append(&self, topic: &str, bytes: Vec<u8>) -> Result<(), EventError> {
        let subject = Self::subject_for(topic);

        let ack = self
            .jetstream
            .publish(subject.clone(), bytes.into())
            .await
            .map_err(|e| EventError::StreamPublishFailed {
                subject: subject.clone(),
                cause: e.to_string(),
            })?;

        ack.await.map_err(|e| EventError::StreamPublishFailed {
            subject,
            cause: e.to_string(),
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_mapping() {
        assert_eq!(
            PersistentStream::subject_for("variants.created"),
            "events.variants.created"
        );
    }

    #[test]
    fn retention_is_thirty_days() {
        assert_eq!(MAX_AGE.as_secs(), 2_592_000);
    }
}
