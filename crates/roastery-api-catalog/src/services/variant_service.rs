//! Variant listing, generation from the option matrix, and price binding.

use std::collections::BTreeMap;

use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use roastery_db::models::{CreateVariant, Price, Product, Variant};
use roastery_events::{topics, EventBus};
use roastery_webhooks::weight::parse_weight_grams;

use crate::error::CatalogError;
use crate::models::responses::GeneratedVariantsResponse;

/// Service for variant operations.
pub struct VariantService {
    pool: PgPool,
    bus: EventBus,
}

impl VariantService {
    pub fn new(pool: PgPool, bus: EventBus) -> Self {
        Self { pool, bus }
    }

    pub async fn get_variant(&self, id: Uuid) -> Result<Variant, CatalogError> {
        Variant::find_by_id(&self.pool, id)
            .await?
            .ok_or(CatalogError::VariantNotFound)
    }

    pub async fn list_for_product(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<Variant>, CatalogError> {
        Product::find_by_id(&self.pool, product_id)
            .await?
            .ok_or(CatalogError::ProductNotFound)?;
        Ok(Variant::list_by_product(&self.pool, product_id).await?)
    }

    /// Generate variants for every unclaimed combination of the product's
    /// option matrix. New variants start without Stripe identifiers and are
    /// announced on `variants.queued` for later export.
    #[instrument(skip(self))]
    pub async fn generate_variants(
        &self,
        product_id: Uuid,
    ) -> Result<GeneratedVariantsResponse, CatalogError> {
        let product = Product::find_by_id(&self.pool, product_id)
            .await?
            .ok_or(CatalogError::ProductNotFound)?;

        if product.options.0.is_empty() {
            return Err(CatalogError::field(
                "options",
                "product has no options configured",
            ));
        }

        let combinations = option_combinations(&product.options.0);

        let mut created = Vec::new();
        let mut skipped = 0;

        for options in combinations {
            if Variant::options_exist(&self.pool, product.id, &options).await? {
                skipped += 1;
                continue;
            }

            let weight_grams = options
                .get("weight")
                .map(|raw| parse_weight_grams(raw))
                .unwrap_or(product.base_weight_grams);

            let variant = Variant::create(
                &self.pool,
                &CreateVariant {
                    product_id: product.id,
                    price_id: None,
                    stripe_product_id: String::new(),
                    stripe_price_id: String::new(),
                    active: product.active,
                    stock_level: 0,
                    weight_grams,
                    options,
                },
            )
            .await?;

            self.bus.publish(
                topics::variants::CREATED,
                serde_json::json!({
                    "variant_id": variant.id,
                    "product_id": product.id,
                    "options": variant.options.0,
                }),
            );
            self.bus.publish(
                topics::variants::QUEUED,
                serde_json::json!({
                    "variant_id": variant.id,
                    "product_id": product.id,
                }),
            );

            created.push(variant);
        }

        tracing::info!(
            product_id = %product.id,
            created = created.len(),
            skipped,
            "Variant generation finished"
        );

        Ok(GeneratedVariantsResponse { created, skipped })
    }

    /// Bind a price to a variant. The price must belong to the variant's
    /// product; the Stripe price id is kept in step.
    #[instrument(skip(self))]
    pub async fn assign_price(
        &self,
        variant_id: Uuid,
        price_id: Uuid,
    ) -> Result<Variant, CatalogError> {
        let variant = self.get_variant(variant_id).await?;

        let price = Price::find_by_id(&self.pool, price_id)
            .await?
            .ok_or(CatalogError::PriceNotFound)?;

        if price.product_id != variant.product_id {
            return Err(CatalogError::field(
                "priceId",
                "price belongs to a different product",
            ));
        }

        let updated =
            Variant::assign_price(&self.pool, variant.id, price.id, &price.stripe_id)
                .await?
                .ok_or(CatalogError::VariantNotFound)?;

        tracing::info!(
            variant_id = %updated.id,
            price_id = %price.id,
            "Price assigned to variant"
        );

        self.bus.publish(
            topics::variants::PRICE_ASSIGNED,
            serde_json::json!({
                "variant_id": updated.id,
                "product_id": updated.product_id,
                "price_id": price.id,
                "stripe_price_id": price.stripe_id,
            }),
        );

        Ok(updated)
    }
}

/// Cartesian product of the option matrix, in key order.
fn option_combinations(
    options: &BTreeMap<String, Vec<String>>,
) -> Vec<BTreeMap<String, String>> {
    let mut combinations: Vec<BTreeMap<String, String>> = vec![BTreeMap::new()];

    for (key, values) in options {
        if values.is_empty() {
            continue;
        }
        let mut next = Vec::with_capacity(combinations.len() * values.len());
        for combination in &combinations {
            for value in values {
                let mut extended = combination.clone();
                extended.insert(key.clone(), value.clone());
                next.push(extended);
            }
        }
        combinations = next;
    }

    combinations.retain(|c| !c.is_empty());
    combinations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(key, values)| {
                (
                    (*key).to_string(),
                    values.iter().map(|v| (*v).to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn single_option_yields_one_variant_per_value() {
        let combos = option_combinations(&matrix(&[("weight", &["12oz", "3lb"])]));
        assert_eq!(combos.len(), 2);
        assert_eq!(combos[0].get("weight").map(String::as_str), Some("12oz"));
    }

    #[test]
    fn two_options_yield_cartesian_product() {
        let combos = option_combinations(&matrix(&[
            ("grind", &["whole", "espresso"]),
            ("weight", &["12oz", "3lb"]),
        ]));

        assert_eq!(combos.len(), 4);
        for combo in &combos {
            assert_eq!(combo.len(), 2);
        }
        // every pair is distinct
        let unique: std::collections::HashSet<String> = combos
            .iter()
            .map(|c| serde_json::to_string(c).unwrap())
            .collect();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn empty_matrix_yields_nothing() {
        assert!(option_combinations(&matrix(&[])).is_empty());
        assert!(option_combinations(&matrix(&[("weight", &[])])).is_empty());
    }
}
