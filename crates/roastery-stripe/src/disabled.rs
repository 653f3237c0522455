//! Disabled-mode stub client.
//!
//! Active when no Stripe secret key is configured. Creates return
//! deterministic identifiers derived from the request content (UUIDv5), with
//! a `_stub_` marker that live Stripe ids can never contain, so development
//! data is recognizable and collision-free.

use async_trait::async_trait;
use uuid::Uuid;

use crate::client::{CreatePriceRequest, CreateProductRequest, ProviderClient};
use crate::error::ProviderError;
use crate::types::{StripePrice, StripeProduct, StripeRecurring};

const PRODUCT_PREFIX: &str = "prod_stub_";
const PRICE_PREFIX: &str = "price_stub_";

/// Stub provider for development without Stripe credentials.
#[derive(Debug, Default)]
pub struct DisabledClient;

impl DisabledClient {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn synthetic_id(prefix: &str, seed: &str) -> String {
        let id = Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes());
        format!("{prefix}{}", id.simple())
    }
}

#[async_trait]
impl ProviderClient for DisabledClient {
    async fn get_product(&self, provider_id: &str) -> Result<StripeProduct, ProviderError> {
        Err(ProviderError::NotFound(format!(
            "disabled mode has no product '{provider_id}'"
        )))
    }

    async fn create_product(
        &self,
        request: &CreateProductRequest,
    ) -> Result<StripeProduct, ProviderError> {
        let id = Self::synthetic_id(PRODUCT_PREFIX, &request.name);
        tracing::debug!(stripe_id = %id, name = %request.name, "Stubbed Stripe product create");

        Ok(StripeProduct {
            id,
            name: request.name.clone(),
            description: Some(request.description.clone()),
            active: true,
            images: request.images.clone(),
            metadata: request.metadata.clone(),
            created: 0,
        })
    }

    async fn create_price(
        &self,
        request: &CreatePriceRequest,
    ) -> Result<StripePrice, ProviderError> {
        let seed = format!(
            "{}:{}:{}",
            request.product, request.unit_amount, request.currency
        );
        let id = Self::synthetic_id(PRICE_PREFIX, &seed);
        tracing::debug!(stripe_id = %id, product = %request.product, "Stubbed Stripe price create");

        Ok(StripePrice {
            id,
            product: request.product.clone(),
            nickname: None,
            unit_amount: request.unit_amount,
            currency: request.currency.to_lowercase(),
            recurring: request.recurring.as_ref().map(|(interval, count)| {
                StripeRecurring {
                    interval: interval.clone(),
                    interval_count: *count,
                }
            }),
            active: true,
            created: 0,
        })
    }

    async fn list_all_products(&self) -> Result<Vec<StripeProduct>, ProviderError> {
        Ok(Vec::new())
    }

    async fn find_product_by_name(
        &self,
        _name: &str,
    ) -> Result<Option<StripeProduct>, ProviderError> {
        Ok(None)
    }

    async fn find_product_by_metadata(
        &self,
        _key: &str,
        _value: &str,
    ) -> Result<Option<StripeProduct>, ProviderError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_creates_are_deterministic_and_prefixed() {
        let client = DisabledClient::new();
        let request = CreateProductRequest {
            name: "Ethiopia Yirgacheffe - 12oz".to_string(),
            ..Default::default()
        };

        let first = client.create_product(&request).await.unwrap();
        let second = client.create_product(&request).await.unwrap();

        assert_eq!(first.id, second.id);
        assert!(first.id.starts_with("prod_stub_"));
    }

    #[tokio::test]
    async fn different_names_get_different_ids() {
        let client = DisabledClient::new();
        let a = client
            .create_product(&CreateProductRequest {
                name: "A".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let b = client
            .create_product(&CreateProductRequest {
                name: "B".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn stub_price_mirrors_recurring_block() {
        let client = DisabledClient::new();
        let price = client
            .create_price(&CreatePriceRequest {
                product: "prod_stub_x".to_string(),
                unit_amount: 1500,
                currency: "USD".to_string(),
                recurring: Some(("month".to_string(), 1)),
            })
            .await
            .unwrap();

        assert!(price.id.starts_with("price_stub_"));
        assert_eq!(price.currency, "usd");
        assert_eq!(price.recurring.unwrap().interval, "month");
    }

    #[tokio::test]
    async fn lookups_are_negative() {
        let client = DisabledClient::new();
        assert!(client.get_product("prod_live").await.unwrap_err().is_not_found());
        assert!(client.list_all_products().await.unwrap().is_empty());
        assert!(client
            .find_product_by_name("anything")
            .await
            .unwrap()
            .is_none());
    }
}
