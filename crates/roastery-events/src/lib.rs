//! # roastery-events
//!
//! Process-wide publish/subscribe for catalog domain events.
//!
//! The bus fans out to in-process subscribers with at-least-once delivery and
//! per-topic ordering for a single publisher. Durable topics can additionally
//! be appended to a NATS JetStream stream (`events`, subjects
//! `events.<topic>`, file-backed, 30-day retention) so external consumers can
//! replay them.
//!
//! The bus is an explicitly passed collaborator: construct it once at
//! startup, hand clones to every component that publishes, and call
//! [`EventBus::close`] during shutdown after publishers have quiesced.
//!
//! ## Example
//!
//! ```rust,ignore
//! use roastery_events::{topics, EventBus};
//!
//! let bus = EventBus::new("commerce-api", &mut registry);
//! bus.publish(topics::variants::CREATED, serde_json::json!({"variant_id": id}));
//! bus.close().await;
//! ```

pub mod bus;
pub mod envelope;
pub mod error;
pub mod metrics;
pub mod stream;
pub mod topics;

pub use bus::{EventBus, MessageHandler, SubscriptionHandle};
pub use envelope::EventEnvelope;
pub use error::EventError;
pub use metrics::BusMetrics;
pub use stream::PersistentStream;
