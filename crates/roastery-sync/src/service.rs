//! The reconciler: one sweep over the local catalog.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::instrument;

use roastery_db::models::Product;
use roastery_stripe::{ProviderClient, StripeProduct};

use crate::error::SyncError;
use crate::matching::best_fuzzy_match;
use crate::report::{MatchStatus, MatchStrategy, ProductSyncResult, SyncReport};

const PAGE_SIZE: i64 = 100;

/// Repairs stale Stripe ids on local products.
pub struct Reconciler {
    pool: PgPool,
    provider: Arc<dyn ProviderClient>,
}

impl Reconciler {
    pub fn new(pool: PgPool, provider: Arc<dyn ProviderClient>) -> Self {
        Self { pool, provider }
    }

    /// Sweep every local product (archived and inactive included), resolve
    /// its Stripe counterpart, repair mismatches, and report.
    ///
    /// Products are processed strictly in order; the per-product rows land in
    /// the report in sweep order.
    #[instrument(skip(self))]
    pub async fn sync_stripe_ids(&self) -> Result<SyncReport, SyncError> {
        // one paginated sweep of the Stripe catalog feeds the fuzzy strategy
        let prefetched = self
            .provider
            .list_all_products()
            .await
            .map_err(|e| SyncError::Provider(e.to_string()))?;

        tracing::info!(
            stripe_products = prefetched.len(),
            "Starting Stripe id reconciliation"
        );

        let mut report = SyncReport::new();
        let mut offset = 0;

        loop {
            let products = Product::list(&self.pool, true, PAGE_SIZE, offset).await?;
            if products.is_empty() {
                break;
            }

            for product in &products {
                let result = self.reconcile_product(product, &prefetched).await;
                report.push(result);
            }

            offset += PAGE_SIZE;
        }

        tracing::info!(
            total = report.total,
            ok = report.ok,
            mismatches = report.mismatches,
            not_found = report.not_found,
            errors = report.errors,
            updated = report.updated,
            "Reconciliation finished"
        );

        Ok(report)
    }

    async fn reconcile_product(
        &self,
        product: &Product,
        prefetched: &[StripeProduct],
    ) -> ProductSyncResult {
        match self.resolve(product, prefetched).await {
            Ok(Some((stripe_product, strategy))) => {
                if product.stripe_id == stripe_product.id {
                    ProductSyncResult {
                        product_id: product.id,
                        product_name: product.name.clone(),
                        status: MatchStatus::Ok,
                        stripe_id: Some(stripe_product.id),
                        matched_by: Some(strategy),
                        updated: false,
                        message: None,
                    }
                } else {
                    self.repair(product, stripe_product, strategy).await
                }
            }
            Ok(None) => {
                tracing::warn!(
                    product_id = %product.id,
                    name = %product.name,
                    "No Stripe counterpart found"
                );
                ProductSyncResult {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    status: MatchStatus::NotFound,
                    stripe_id: None,
                    matched_by: None,
                    updated: false,
                    message: None,
                }
            }
            Err(e) => {
                tracing::error!(
                    product_id = %product.id,
                    error = %e,
                    "Reconciliation failed for product"
                );
                ProductSyncResult {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    status: MatchStatus::Error,
                    stripe_id: None,
                    matched_by: None,
                    updated: false,
                    message: Some(e.to_string()),
                }
            }
        }
    }

    /// Write the resolved id. A failed write keeps the mismatch
    /// classification with `updated = false`.
    async fn repair(
        &self,
        product: &Product,
        stripe_product: StripeProduct,
        strategy: MatchStrategy,
    ) -> ProductSyncResult {
        let old_id = if product.stripe_id.is_empty() {
            "<empty>"
        } else {
            product.stripe_id.as_str()
        };

        match Product::update_stripe_id(&self.pool, product.id, &stripe_product.id).await
        {
            Ok(_) => {
                tracing::info!(
                    product_id = %product.id,
                    old_stripe_id = %old_id,
                    new_stripe_id = %stripe_product.id,
                    strategy = ?strategy,
                    "Repaired Stripe id"
                );
                ProductSyncResult {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    status: MatchStatus::Mismatch,
                    stripe_id: Some(stripe_product.id),
                    matched_by: Some(strategy),
                    updated: true,
                    message: None,
                }
            }
            Err(e) => ProductSyncResult {
                product_id: product.id,
                product_name: product.name.clone(),
                status: MatchStatus::Mismatch,
                stripe_id: Some(stripe_product.id),
                matched_by: Some(strategy),
                updated: false,
                message: Some(format!("repair write failed: {e}")),
            },
        }
    }

    /// Tiered resolution; first success wins.
    async fn resolve(
        &self,
        product: &Product,
        prefetched: &[StripeProduct],
    ) -> Result<Option<(StripeProduct, MatchStrategy)>, SyncError> {
        // S1: the stored id still resolves
        if !product.stripe_id.is_empty() {
            match self.provider.get_product(&product.stripe_id).await {
                Ok(found) => return Ok(Some((found, MatchStrategy::StoredId))),
                Err(e) if e.is_not_found() => {
                    tracing::debug!(
                        product_id = %product.id,
                        stripe_id = %product.stripe_id,
                        "Stored Stripe id no longer resolves"
                    );
                }
                Err(e) => return Err(SyncError::Provider(e.to_string())),
            }
        }

        // S2: exact name
        if let Some(found) = self
            .provider
            .find_product_by_name(&product.name)
            .await
            .map_err(|e| SyncError::Provider(e.to_string()))?
        {
            return Ok(Some((found, MatchStrategy::NameMatch)));
        }

        // S3: metadata back-reference
        if let Some(found) = self
            .provider
            .find_product_by_metadata("original_product_id", &product.id.to_string())
            .await
            .map_err(|e| SyncError::Provider(e.to_string()))?
        {
            return Ok(Some((found, MatchStrategy::MetadataMatch)));
        }

        // S4: fuzzy name over the prefetched catalog
        if let Some((candidate, score)) = best_fuzzy_match(&product.name, prefetched) {
            tracing::debug!(
                product_id = %product.id,
                candidate = %candidate.name,
                score,
                "Fuzzy name match accepted"
            );
            return Ok(Some((candidate.clone(), MatchStrategy::FuzzyName)));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    // The strategy cascade is covered through unit tests on matching.rs and
    // report.rs; end-to-end reconciliation runs need PostgreSQL and live in
    // the integration suite.
}
