//! # roastery-stripe
//!
//! Typed access to the Stripe product/price catalog.
//!
//! The rest of the system depends only on the [`ProviderClient`] capability
//! trait. Two implementations exist:
//!
//! - [`StripeHttpClient`]: the live REST client (form-encoded writes,
//!   paginated listing, search API).
//! - [`DisabledClient`]: used when no secret key is configured. Creates
//!   return deterministic `_stub_`-prefixed identifiers so development
//!   environments run without external calls and can never collide with
//!   live Stripe ids.

pub mod client;
pub mod disabled;
pub mod error;
pub mod http;
pub mod types;

pub use client::{CreatePriceRequest, CreateProductRequest, ProviderClient};
pub use disabled::DisabledClient;
pub use error::ProviderError;
pub use http::StripeHttpClient;
pub use types::{StripePrice, StripeProduct, StripeRecurring};

use std::sync::Arc;

/// Build a provider client from the configured secret key.
///
/// An empty key selects the disabled stub, the documented development mode.
#[must_use]
pub fn client_from_secret_key(secret_key: &str) -> Arc<dyn ProviderClient> {
    if secret_key.is_empty() {
        tracing::warn!("No Stripe secret key configured, using disabled stub client");
        Arc::new(DisabledClient::new())
    } else {
        Arc::new(StripeHttpClient::new(secret_key))
    }
}
