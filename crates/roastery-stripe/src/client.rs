//! The provider capability trait.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::error::ProviderError;
use crate::types::{StripePrice, StripeProduct};

/// Input for creating a Stripe product.
#[derive(Debug, Clone, Default)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub images: Vec<String>,
    pub metadata: BTreeMap<String, String>,
}

/// Input for creating a Stripe price.
#[derive(Debug, Clone)]
pub struct CreatePriceRequest {
    /// Stripe product the price belongs to.
    pub product: String,
    /// Amount in minor units.
    pub unit_amount: i64,
    /// Lowercase ISO-4217 code, as Stripe expects.
    pub currency: String,
    /// `(interval, interval_count)` for recurring prices.
    pub recurring: Option<(String, i64)>,
}

/// Capability set the sync engine requires from the catalog provider.
///
/// All operations are fallible; [`ProviderError::is_not_found`] distinguishes
/// negative probes from real failures.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Fetch a product by its Stripe id.
    async fn get_product(&self, provider_id: &str) -> Result<StripeProduct, ProviderError>;

    /// Create a product in the Stripe catalog.
    async fn create_product(
        &self,
        request: &CreateProductRequest,
    ) -> Result<StripeProduct, ProviderError>;

    /// Create a price attached to a Stripe product.
    async fn create_price(
        &self,
        request: &CreatePriceRequest,
    ) -> Result<StripePrice, ProviderError>;

    /// List every product in the catalog. Pagination is handled internally;
    /// callers see one finite sequence.
    async fn list_all_products(&self) -> Result<Vec<StripeProduct>, ProviderError>;

    /// Find a product whose name matches exactly.
    async fn find_product_by_name(
        &self,
        name: &str,
    ) -> Result<Option<StripeProduct>, ProviderError>;

    /// Find a product carrying the given metadata key/value.
    async fn find_product_by_metadata(
        &self,
        key: &str,
        value: &str,
    ) -> Result<Option<StripeProduct>, ProviderError>;
}
