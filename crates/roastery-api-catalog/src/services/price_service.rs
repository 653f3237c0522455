//! Price CRUD with Stripe origination.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use roastery_db::models::{
    CreatePrice, Price, PriceInterval, PriceType, Product, UpdatePrice, Variant,
};
use roastery_events::{topics, EventBus};
use roastery_stripe::{CreatePriceRequest as StripeCreatePrice, ProviderClient};
use roastery_webhooks::naming::price_display_name;

use crate::error::CatalogError;
use crate::models::requests::{CreatePriceRequest, UpdatePriceRequest};
use crate::validation::{validate_currency, validate_recurrence, Validator};

/// Service for price operations.
///
/// Prices created locally are originated in Stripe when the owning product
/// has an exported variant; a Stripe failure degrades to a local-only price
/// (empty `stripe_id`) rather than failing the request, since the database
/// is the source of truth and reconciliation closes the gap later.
pub struct PriceService {
    pool: PgPool,
    bus: EventBus,
    provider: Arc<dyn ProviderClient>,
}

impl PriceService {
    pub fn new(pool: PgPool, bus: EventBus, provider: Arc<dyn ProviderClient>) -> Self {
        Self {
            pool,
            bus,
            provider,
        }
    }

    #[instrument(skip(self, request), fields(product_id = %request.product_id))]
    pub async fn create_price(
        &self,
        request: &CreatePriceRequest,
    ) -> Result<Price, CatalogError> {
        let recurring = match request.price_type.as_str() {
            "recurring" => true,
            "one_time" => false,
            other => {
                return Err(CatalogError::field(
                    "type",
                    format!("unknown price type '{other}'"),
                ))
            }
        };

        let mut validator = Validator::new();
        validator.require(request.amount > 0, "amount", "must be positive");
        validate_currency(&mut validator, &request.currency);
        validate_recurrence(
            &mut validator,
            recurring,
            request.interval.as_deref(),
            request.interval_count,
        );
        validator.finish()?;

        let product = Product::find_by_id(&self.pool, request.product_id)
            .await?
            .ok_or(CatalogError::ProductNotFound)?;

        let (price_type, interval, interval_count) = if recurring {
            let interval = request
                .interval
                .as_deref()
                .and_then(PriceInterval::parse)
                .expect("validated above");
            (
                PriceType::Recurring,
                Some(interval),
                request.interval_count,
            )
        } else {
            (PriceType::OneTime, None, None)
        };

        let name = if request.name.trim().is_empty() {
            price_display_name(
                &product.name,
                None,
                request.amount,
                &request.currency,
                interval.map(|i| (i.as_str(), i64::from(interval_count.unwrap_or(1)))),
            )
        } else {
            request.name.clone()
        };

        let stripe_id = self.originate_in_stripe(&product, request, interval).await;

        let price = Price::create(
            &self.pool,
            &CreatePrice {
                product_id: product.id,
                name,
                amount: request.amount,
                currency: request.currency.clone(),
                price_type,
                recurring_interval: interval,
                interval_count,
                active: true,
                stripe_id,
            },
        )
        .await?;

        tracing::info!(price_id = %price.id, product_id = %product.id, "Price created");

        self.bus.publish(
            topics::prices::CREATED,
            serde_json::json!({
                "price_id": price.id,
                "product_id": product.id,
                "amount": price.amount,
                "currency": price.currency,
                "type": price.price_type,
            }),
        );

        Ok(price)
    }

    /// Create the counterpart Stripe price when the product has an exported
    /// variant. Failure is logged, not surfaced.
    async fn originate_in_stripe(
        &self,
        product: &Product,
        request: &CreatePriceRequest,
        interval: Option<PriceInterval>,
    ) -> String {
        let variants = match Variant::list_by_product(&self.pool, product.id).await {
            Ok(variants) => variants,
            Err(e) => {
                tracing::warn!(error = %e, "Could not load variants for price origination");
                return String::new();
            }
        };

        let Some(variant) = variants.iter().find(|v| !v.stripe_product_id.is_empty())
        else {
            tracing::debug!(
                product_id = %product.id,
                "No exported variant; price stays local-only"
            );
            return String::new();
        };

        let stripe_request = StripeCreatePrice {
            product: variant.stripe_product_id.clone(),
            unit_amount: request.amount,
            currency: request.currency.to_lowercase(),
            recurring: interval.map(|i| {
                (
                    i.as_str().to_string(),
                    i64::from(request.interval_count.unwrap_or(1)),
                )
            }),
        };

        match self.provider.create_price(&stripe_request).await {
            Ok(created) => created.id,
            Err(e) => {
                tracing::warn!(
                    product_id = %product.id,
                    error = %e,
                    "Stripe price origination failed; continuing local-only"
                );
                String::new()
            }
        }
    }

    pub async fn get_price(&self, id: Uuid) -> Result<Price, CatalogError> {
        Price::find_by_id(&self.pool, id)
            .await?
            .ok_or(CatalogError::PriceNotFound)
    }

    pub async fn list_prices(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Price>, CatalogError> {
        Ok(Price::list(&self.pool, limit.clamp(1, 200), offset.max(0)).await?)
    }

    pub async fn list_by_product(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<Price>, CatalogError> {
        Product::find_by_id(&self.pool, product_id)
            .await?
            .ok_or(CatalogError::ProductNotFound)?;
        Ok(Price::list_by_product(&self.pool, product_id).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn update_price(
        &self,
        id: Uuid,
        request: &UpdatePriceRequest,
    ) -> Result<Price, CatalogError> {
        let price = Price::update(
            &self.pool,
            id,
            &UpdatePrice {
                name: request.name.clone(),
                active: request.active,
                stripe_id: None,
            },
        )
        .await?
        .ok_or(CatalogError::PriceNotFound)?;

        self.bus.publish(
            topics::prices::UPDATED,
            serde_json::json!({
                "price_id": price.id,
                "product_id": price.product_id,
                "active": price.active,
            }),
        );

        Ok(price)
    }

    /// Delete a price, forbidden while any variant references it.
    #[instrument(skip(self))]
    pub async fn delete_price(&self, id: Uuid) -> Result<(), CatalogError> {
        let price = self.get_price(id).await?;

        let references = Variant::count_by_price(&self.pool, id).await?;
        if references > 0 {
            return Err(CatalogError::PriceInUse);
        }

        Price::delete(&self.pool, id).await?;

        tracing::info!(price_id = %id, "Price deleted");

        self.bus.publish(
            topics::prices::DELETED,
            serde_json::json!({
                "price_id": id,
                "product_id": price.product_id,
            }),
        );

        Ok(())
    }

    /// Variants currently selling at a price.
    pub async fn variants_for_price(
        &self,
        price_id: Uuid,
    ) -> Result<Vec<Variant>, CatalogError> {
        self.get_price(price_id).await?;
        Ok(Variant::list_by_price(&self.pool, price_id).await?)
    }
}
