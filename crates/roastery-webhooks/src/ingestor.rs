//! Webhook event application.
//!
//! One `WebhookIngestor` is shared across requests; it holds no mutable
//! state, so concurrent deliveries only contend on the database, where the
//! sync-hash unique constraint serializes last-writer-wins.

use std::collections::BTreeMap;

use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use roastery_db::models::{
    CreatePrice, CreateVariant, Price, PriceInterval, PriceType, Product, SyncHash,
    SyncHashRecord, SyncSource, UpdatePrice, Variant, VariantSyncUpdate, WebhookEvent,
};
use roastery_events::{topics, EventBus};
use roastery_stripe::{StripePrice, StripeProduct};

use crate::error::WebhookError;
use crate::event::{EventKind, StripeEvent};
use crate::hash::hash_stripe_product;
use crate::naming::price_display_name;
use crate::weight::{parse_weight_grams, DEFAULT_CREATED_WEIGHT_GRAMS};

/// Placeholder price amount (minor units) for bootstrapped variants; the
/// real `price.created` webhook rebinds the variant later.
const PLACEHOLDER_AMOUNT: i64 = 1000;

/// Metadata keys that never become variant options.
const NON_OPTION_KEYS: [&str; 6] = [
    "product_id",
    "original_product_id",
    "weight",
    "sync_hash",
    "last_sync",
    "sync_source",
];

/// Applies verified Stripe events to local state.
pub struct WebhookIngestor {
    pool: PgPool,
    bus: EventBus,
}

impl WebhookIngestor {
    pub fn new(pool: PgPool, bus: EventBus) -> Self {
        Self { pool, bus }
    }

    /// Dispatch a decoded event to its handler.
    #[instrument(skip(self, event), fields(event_id = %event.id, event_type = %event.event_type))]
    pub async fn dispatch(&self, event: &StripeEvent) -> Result<(), WebhookError> {
        match event.classify()? {
            EventKind::ProductCreated(product) => {
                self.handle_product_created(&event.id, &product).await
            }
            EventKind::ProductUpdated(product) => {
                self.handle_product_updated(&event.id, &product).await
            }
            EventKind::ProductDeleted(product) => {
                self.handle_product_deleted(&product).await
            }
            EventKind::PriceCreated(price) => self.handle_price_created(&price).await,
            EventKind::PriceUpdated(price) => self.handle_price_updated(&price).await,
            EventKind::PriceDeleted(price) => self.handle_price_deleted(&price).await,
            EventKind::Stub => self.handle_stub(event).await,
            EventKind::Unknown => {
                tracing::info!(event_type = %event.event_type, "Ignoring unhandled event type");
                Ok(())
            }
        }
    }

    /// `product.created`: bootstrap a local variant for a new Stripe product.
    ///
    /// The Stripe product must carry a `product_id` metadata back-reference
    /// to its local parent; without a parent a variant cannot exist.
    async fn handle_product_created(
        &self,
        event_id: &str,
        product: &StripeProduct,
    ) -> Result<(), WebhookError> {
        if Variant::find_by_stripe_product_id(&self.pool, &product.id)
            .await?
            .is_some()
        {
            tracing::debug!(stripe_product_id = %product.id, "Variant already exists, replay ignored");
            return Ok(());
        }

        let parent_id = product
            .metadata
            .get("product_id")
            .or_else(|| product.metadata.get("original_product_id"))
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or_else(|| WebhookError::MissingProductMetadata {
                event_id: event_id.to_string(),
            })?;

        let Some(parent) = Product::find_by_id(&self.pool, parent_id).await? else {
            return Err(WebhookError::UnknownLocalProduct {
                product_id: parent_id,
                stripe_product_id: product.id.clone(),
            });
        };

        let weight_grams = product
            .metadata
            .get("weight")
            .map(|raw| parse_weight_grams(raw))
            .unwrap_or(DEFAULT_CREATED_WEIGHT_GRAMS);

        let options = bootstrap_options(&product.metadata);

        let placeholder = Price::create(
            &self.pool,
            &CreatePrice {
                product_id: parent.id,
                name: price_display_name(&parent.name, None, PLACEHOLDER_AMOUNT, "USD", None),
                amount: PLACEHOLDER_AMOUNT,
                currency: "USD".to_string(),
                price_type: PriceType::OneTime,
                recurring_interval: None,
                interval_count: None,
                active: true,
                stripe_id: format!("price_placeholder_{}", Uuid::new_v4().simple()),
            },
        )
        .await?;

        let variant = Variant::create(
            &self.pool,
            &CreateVariant {
                product_id: parent.id,
                price_id: Some(placeholder.id),
                stripe_product_id: product.id.clone(),
                stripe_price_id: placeholder.stripe_id.clone(),
                active: product.active,
                stock_level: 0,
                weight_grams,
                options,
            },
        )
        .await?;

        tracing::info!(
            variant_id = %variant.id,
            product_id = %parent.id,
            stripe_product_id = %product.id,
            "Variant bootstrapped from provider product"
        );

        self.bus.publish(
            topics::variants::CREATED,
            serde_json::json!({
                "variant_id": variant.id,
                "product_id": parent.id,
                "stripe_product_id": product.id,
                "options": variant.options.0,
            }),
        );

        Ok(())
    }

    /// `product.updated`: apply field updates, gated on the content hash of
    /// the last accepted payload.
    async fn handle_product_updated(
        &self,
        event_id: &str,
        product: &StripeProduct,
    ) -> Result<(), WebhookError> {
        let Some(variant) =
            Variant::find_by_stripe_product_id(&self.pool, &product.id).await?
        else {
            // update for an untracked product doubles as a create
            return self.handle_product_created(event_id, product).await;
        };

        let content_hash = hash_stripe_product(product);

        if let Some(stored) =
            SyncHash::get_latest(&self.pool, variant.id, &product.id).await?
        {
            if stored.content_hash == content_hash {
                tracing::debug!(
                    variant_id = %variant.id,
                    stripe_product_id = %product.id,
                    "Payload unchanged, skipping"
                );
                return Ok(());
            }
        }

        let weight_grams = match product.metadata.get("weight") {
            Some(raw) => parse_weight_grams(raw),
            None => variant.weight_grams,
        };
        let stock_level = product
            .metadata
            .get("stock_level")
            .and_then(|raw| raw.trim().parse::<i32>().ok());
        let options = merged_options(&variant.options.0, &product.metadata);

        let update = VariantSyncUpdate {
            active: product.active,
            weight_grams,
            stock_level,
            options,
        };

        let Some(updated) =
            Variant::apply_sync_update(&self.pool, variant.id, &update).await?
        else {
            tracing::warn!(variant_id = %variant.id, "Variant vanished during update");
            return Ok(());
        };

        // the hash is only recorded once the variant write committed; a
        // failure here means the next redelivery re-applies harmlessly
        SyncHash::upsert(
            &self.pool,
            &SyncHashRecord::sha256(
                variant.id,
                &product.id,
                &content_hash,
                SyncSource::ProviderWebhook,
            ),
        )
        .await?;

        let price = match updated.price_id {
            Some(price_id) => Price::find_by_id(&self.pool, price_id).await?,
            None => None,
        };

        tracing::info!(
            variant_id = %updated.id,
            stripe_product_id = %product.id,
            "Variant synchronized from provider update"
        );

        self.bus.publish(
            topics::variants::UPDATED,
            serde_json::json!({
                "variant_id": updated.id,
                "product_id": updated.product_id,
                "stripe_product_id": updated.stripe_product_id,
                "stripe_price_id": updated.stripe_price_id,
                "price": price,
                "update_source": SyncSource::ProviderWebhook.as_str(),
            }),
        );

        Ok(())
    }

    /// `product.deleted`: soft-deactivate the variant. Local rows are never
    /// destroyed for a provider delete; orders may still reference them.
    async fn handle_product_deleted(
        &self,
        product: &StripeProduct,
    ) -> Result<(), WebhookError> {
        let Some(variant) =
            Variant::find_by_stripe_product_id(&self.pool, &product.id).await?
        else {
            tracing::debug!(stripe_product_id = %product.id, "Delete for untracked product, ignoring");
            return Ok(());
        };

        let Some(deactivated) = Variant::deactivate(&self.pool, variant.id).await? else {
            return Ok(());
        };

        let product_name = Product::find_by_id(&self.pool, deactivated.product_id)
            .await?
            .map(|p| p.name);

        tracing::info!(
            variant_id = %deactivated.id,
            stripe_product_id = %product.id,
            "Variant deactivated after provider delete"
        );

        self.bus.publish(
            topics::variants::DELETED,
            serde_json::json!({
                "variant_id": deactivated.id,
                "product_id": deactivated.product_id,
                "product_name": product_name,
                "stripe_product_id": product.id,
            }),
        );

        Ok(())
    }

    /// `price.created`: mirror the price locally and bind it to the variant
    /// backed by its Stripe product.
    async fn handle_price_created(&self, price: &StripePrice) -> Result<(), WebhookError> {
        if Price::find_by_stripe_id(&self.pool, &price.id).await?.is_some() {
            tracing::debug!(stripe_price_id = %price.id, "Price already mirrored, replay ignored");
            return Ok(());
        }

        let Some(variant) =
            Variant::find_by_stripe_product_id(&self.pool, &price.product).await?
        else {
            tracing::debug!(
                stripe_price_id = %price.id,
                stripe_product_id = %price.product,
                "Price for untracked product, skipping"
            );
            return Ok(());
        };

        let Some(parent) = Product::find_by_id(&self.pool, variant.product_id).await?
        else {
            return Err(WebhookError::UnknownLocalProduct {
                product_id: variant.product_id,
                stripe_product_id: price.product.clone(),
            });
        };

        let (price_type, recurring_interval, interval_count) = match &price.recurring {
            Some(recurring) => {
                let interval = PriceInterval::parse(&recurring.interval).ok_or_else(
                    || WebhookError::UnsupportedInterval(recurring.interval.clone()),
                )?;
                if !(1..=12).contains(&recurring.interval_count) {
                    return Err(WebhookError::UnsupportedInterval(format!(
                        "{} x{}",
                        recurring.interval, recurring.interval_count
                    )));
                }
                (
                    PriceType::Recurring,
                    Some(interval),
                    Some(recurring.interval_count as i32),
                )
            }
            None => (PriceType::OneTime, None, None),
        };

        let currency = price.currency.to_uppercase();
        let name = price_display_name(
            &parent.name,
            price.nickname.as_deref(),
            price.unit_amount,
            &currency,
            price
                .recurring
                .as_ref()
                .map(|r| (r.interval.as_str(), r.interval_count)),
        );

        let row = Price::create(
            &self.pool,
            &CreatePrice {
                product_id: parent.id,
                name,
                amount: price.unit_amount,
                currency,
                price_type,
                recurring_interval,
                interval_count,
                active: price.active,
                stripe_id: price.id.clone(),
            },
        )
        .await?;

        let updated = Variant::assign_price(&self.pool, variant.id, row.id, &price.id)
            .await?
            .unwrap_or(variant);

        tracing::info!(
            price_id = %row.id,
            variant_id = %updated.id,
            stripe_price_id = %price.id,
            "Price mirrored and bound to variant"
        );

        self.bus.publish(
            topics::variants::UPDATED,
            serde_json::json!({
                "variant_id": updated.id,
                "product_id": updated.product_id,
                "stripe_product_id": updated.stripe_product_id,
                "stripe_price_id": price.id,
                "price": row,
                "update_source": SyncSource::ProviderWebhook.as_str(),
            }),
        );

        Ok(())
    }

    /// `price.updated`: refresh the mirrored fields and repair the owning
    /// variant's Stripe price back-reference if it drifted.
    async fn handle_price_updated(&self, price: &StripePrice) -> Result<(), WebhookError> {
        let Some(local) = Price::find_by_stripe_id(&self.pool, &price.id).await? else {
            return self.handle_price_created(price).await;
        };

        let name = price
            .nickname
            .as_deref()
            .filter(|n| !n.is_empty())
            .map(ToString::to_string);

        let updated = Price::update(
            &self.pool,
            local.id,
            &UpdatePrice {
                name,
                active: Some(price.active),
                stripe_id: None,
            },
        )
        .await?
        .unwrap_or(local);

        if let Some(variant) =
            Variant::find_by_stripe_product_id(&self.pool, &price.product).await?
        {
            if variant.price_id == Some(updated.id) && variant.stripe_price_id != price.id {
                Variant::assign_price(&self.pool, variant.id, updated.id, &price.id)
                    .await?;
                tracing::info!(
                    variant_id = %variant.id,
                    stripe_price_id = %price.id,
                    "Repaired variant price back-reference"
                );
            }
        }

        self.bus.publish(
            topics::prices::UPDATED,
            serde_json::json!({
                "price_id": updated.id,
                "product_id": updated.product_id,
                "stripe_price_id": price.id,
                "active": updated.active,
            }),
        );

        Ok(())
    }

    /// `price.deleted`: soft-deactivate the mirrored price.
    async fn handle_price_deleted(&self, price: &StripePrice) -> Result<(), WebhookError> {
        let Some(local) = Price::find_by_stripe_id(&self.pool, &price.id).await? else {
            tracing::debug!(stripe_price_id = %price.id, "Delete for unmirrored price, ignoring");
            return Ok(());
        };

        Price::update(
            &self.pool,
            local.id,
            &UpdatePrice {
                name: None,
                active: Some(false),
                stripe_id: None,
            },
        )
        .await?;

        tracing::info!(price_id = %local.id, stripe_price_id = %price.id, "Price deactivated");

        self.bus.publish(
            topics::prices::DELETED,
            serde_json::json!({
                "price_id": local.id,
                "product_id": local.product_id,
                "stripe_price_id": price.id,
            }),
        );

        Ok(())
    }

    /// Out-of-core namespaces: record and acknowledge.
    async fn handle_stub(&self, event: &StripeEvent) -> Result<(), WebhookError> {
        WebhookEvent::record(&self.pool, &event.id, &event.event_type).await?;
        tracing::debug!(
            event_id = %event.id,
            event_type = %event.event_type,
            "Recorded stub event"
        );
        Ok(())
    }
}

/// Options for a bootstrapped variant: every metadata key that is not a
/// back-reference or sync bookkeeping, including `weight` itself.
fn bootstrap_options(metadata: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    metadata
        .iter()
        .filter(|(key, _)| {
            key.as_str() == "weight" || !NON_OPTION_KEYS.contains(&key.as_str())
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Merge option updates into an existing variant options map: direct
/// `weight`/`grind` keys plus `variant_<key>` prefixed keys.
fn merged_options(
    existing: &BTreeMap<String, String>,
    metadata: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut options = existing.clone();

    for key in ["weight", "grind"] {
        if let Some(value) = metadata.get(key) {
            options.insert(key.to_string(), value.clone());
        }
    }

    for (key, value) in metadata {
        if let Some(option_key) = key.strip_prefix("variant_") {
            if !option_key.is_empty() {
                options.insert(option_key.to_string(), value.clone());
            }
        }
    }

    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn bootstrap_options_keep_weight_drop_references() {
        let options = bootstrap_options(&meta(&[
            ("product_id", "7f4e0000-0000-0000-0000-000000000000"),
            ("weight", "12oz"),
            ("grind", "whole"),
            ("sync_source", "local_api"),
        ]));

        assert_eq!(options.get("weight").map(String::as_str), Some("12oz"));
        assert_eq!(options.get("grind").map(String::as_str), Some("whole"));
        assert!(!options.contains_key("product_id"));
        assert!(!options.contains_key("sync_source"));
    }

    #[test]
    fn merged_options_overlay_direct_keys() {
        let existing = meta(&[("weight", "12oz"), ("grind", "whole")]);
        let merged = merged_options(&existing, &meta(&[("grind", "espresso")]));

        assert_eq!(merged.get("weight").map(String::as_str), Some("12oz"));
        assert_eq!(merged.get("grind").map(String::as_str), Some("espresso"));
    }

    #[test]
    fn merged_options_accept_variant_prefix() {
        let merged = merged_options(
            &meta(&[]),
            &meta(&[("variant_roast", "dark"), ("variant_", "ignored"), ("other", "x")]),
        );

        assert_eq!(merged.get("roast").map(String::as_str), Some("dark"));
        assert!(!merged.contains_key(""));
        assert!(!merged.contains_key("other"));
    }
}
