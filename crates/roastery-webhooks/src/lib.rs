//! # roastery-webhooks
//!
//! Inbound Stripe webhook pipeline.
//!
//! Each request is verified (HMAC-SHA256 over `{timestamp}.{body}`, constant
//! time), decoded, and dispatched to a per-event-type handler. Application is
//! idempotent: `product.updated` is gated on the stored content hash of the
//! last accepted payload, and every response is `200 {"status":"success"}`
//! once the signature checks out, because Stripe treats non-2xx as a retry
//! signal and retries only amplify damage.

pub mod error;
pub mod event;
pub mod hash;
pub mod ingestor;
pub mod metrics;
pub mod naming;
pub mod router;
pub mod signature;
pub mod weight;

pub use error::WebhookError;
pub use event::{EventKind, StripeEvent};
pub use ingestor::WebhookIngestor;
pub use metrics::WebhookMetrics;
pub use router::{webhook_router, WebhookState, MAX_BODY_BYTES};
