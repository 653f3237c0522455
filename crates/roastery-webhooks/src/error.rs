//! Error types for the webhook ingestor.

use thiserror::Error;

/// Webhook pipeline error variants.
///
/// Only the pre-verification failures surface to Stripe (400/503); everything
/// after a verified signature is logged and acknowledged with 200, since a
/// non-2xx only triggers a retry of the same payload.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Missing Stripe-Signature header")]
    MissingSignature,

    #[error("Invalid webhook signature")]
    InvalidSignature,

    #[error("Failed to read request body")]
    BodyRead,

    #[error("Failed to decode {context}: {cause}")]
    Decode { context: String, cause: String },

    #[error("Event {event_id} has no usable product_id metadata")]
    MissingProductMetadata { event_id: String },

    #[error("Local product {product_id} not found for provider product {stripe_product_id}")]
    UnknownLocalProduct {
        product_id: uuid::Uuid,
        stripe_product_id: String,
    },

    #[error("Unsupported price interval '{0}'")]
    UnsupportedInterval(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl WebhookError {
    /// Short kind for logging and the failure metric label.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            WebhookError::MissingSignature => "missing_signature",
            WebhookError::InvalidSignature => "invalid_signature",
            WebhookError::BodyRead => "body_read",
            WebhookError::Decode { .. } => "decode",
            WebhookError::MissingProductMetadata { .. } => "missing_metadata",
            WebhookError::UnknownLocalProduct { .. } => "unknown_product",
            WebhookError::UnsupportedInterval(_) => "unsupported_interval",
            WebhookError::Database(_) => "database",
        }
    }
}
