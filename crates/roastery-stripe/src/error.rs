//! Error types for the Stripe client.

use thiserror::Error;

/// Stripe client error variants.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested object does not exist in the Stripe catalog.
    #[error("Stripe object not found: {0}")]
    NotFound(String),

    /// Stripe returned a non-success status.
    #[error("Stripe API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure (DNS, TLS, timeout).
    #[error("Stripe request failed: {0}")]
    Transport(String),

    /// Response body did not match the expected shape.
    #[error("Failed to decode Stripe response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// True for the not-found case, which match strategies treat as a
    /// negative probe rather than a failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound(_))
            || matches!(self, ProviderError::Api { status: 404, .. })
    }
}
