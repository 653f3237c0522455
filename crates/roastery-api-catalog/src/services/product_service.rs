//! Product CRUD and lifecycle.

use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use roastery_db::models::{CreateProduct, Product, UpdateProduct, Variant};
use roastery_events::{topics, EventBus};

use crate::error::CatalogError;
use crate::models::requests::{CreateProductRequest, ListQuery, UpdateProductRequest};
use crate::validation::{validate_product_name, Validator};

/// Stock level at or below which a `products.low_stock` event fires.
const LOW_STOCK_THRESHOLD: i32 = 10;

/// Service for product operations.
pub struct ProductService {
    pool: PgPool,
    bus: EventBus,
}

impl ProductService {
    pub fn new(pool: PgPool, bus: EventBus) -> Self {
        Self { pool, bus }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_product(
        &self,
        request: &CreateProductRequest,
    ) -> Result<Product, CatalogError> {
        let mut validator = Validator::new();
        validate_product_name(&mut validator, &request.name);
        validator.require(
            request.stock_level >= 0,
            "stockLevel",
            "must not be negative",
        );
        validator.require(
            request.base_weight_grams > 0,
            "baseWeightGrams",
            "must be positive",
        );
        for (key, values) in &request.options {
            validator.require(!key.is_empty(), "options", "option keys must not be empty");
            validator.require(
                !values.is_empty(),
                "options",
                "option values must not be empty",
            );
        }
        validator.finish()?;

        if Product::find_by_name(&self.pool, &request.name)
            .await?
            .is_some()
        {
            return Err(CatalogError::DuplicateProduct);
        }

        let input = CreateProduct {
            name: request.name.clone(),
            description: request.description.clone(),
            image_url: request.image_url.clone(),
            origin: request.origin.clone(),
            roast_level: request.roast_level.clone(),
            flavor_notes: request.flavor_notes.clone(),
            allow_subscription: request.allow_subscription,
            stock_level: request.stock_level,
            base_weight_grams: request.base_weight_grams,
            options: request.options.clone(),
        };

        let product = Product::create(&self.pool, &input)
            .await
            .map_err(|e| map_unique(e, CatalogError::DuplicateProduct))?;

        tracing::info!(product_id = %product.id, "Product created");

        self.bus.publish(
            topics::products::CREATED,
            serde_json::json!({
                "product_id": product.id,
                "name": product.name,
            }),
        );

        Ok(product)
    }

    pub async fn get_product(&self, id: Uuid) -> Result<Product, CatalogError> {
        Product::find_by_id(&self.pool, id)
            .await?
            .ok_or(CatalogError::ProductNotFound)
    }

    pub async fn list_products(
        &self,
        query: &ListQuery,
    ) -> Result<Vec<Product>, CatalogError> {
        let limit = query.limit.clamp(1, 200);
        let offset = query.offset.max(0);
        Ok(Product::list(&self.pool, query.include_hidden, limit, offset).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn update_product(
        &self,
        id: Uuid,
        request: &UpdateProductRequest,
    ) -> Result<Product, CatalogError> {
        let mut validator = Validator::new();
        if let Some(stock) = request.stock_level {
            validator.require(stock >= 0, "stockLevel", "must not be negative");
        }
        validator.finish()?;

        let before = self.get_product(id).await?;

        let input = UpdateProduct {
            description: request.description.clone(),
            image_url: request.image_url.clone(),
            origin: request.origin.clone(),
            roast_level: request.roast_level.clone(),
            flavor_notes: request.flavor_notes.clone(),
            active: request.active,
            allow_subscription: request.allow_subscription,
            stock_level: request.stock_level,
            options: request.options.clone(),
        };

        let product = Product::update(&self.pool, id, &input)
            .await?
            .ok_or(CatalogError::ProductNotFound)?;

        self.bus.publish(
            topics::products::UPDATED,
            serde_json::json!({
                "product_id": product.id,
                "name": product.name,
                "active": product.active,
            }),
        );

        if product.stock_level != before.stock_level {
            self.publish_stock_events(&product, before.stock_level).await;
        }

        Ok(product)
    }

    async fn publish_stock_events(&self, product: &Product, previous_level: i32) {
        self.bus.publish(
            topics::products::STOCK_UPDATED,
            serde_json::json!({
                "product_id": product.id,
                "stock_level": product.stock_level,
                "previous_level": previous_level,
            }),
        );

        if product.stock_level <= LOW_STOCK_THRESHOLD
            && previous_level > LOW_STOCK_THRESHOLD
        {
            tracing::warn!(
                product_id = %product.id,
                stock_level = product.stock_level,
                "Product stock is low"
            );
            // durable: alerting consumers replay low-stock signals after a
            // restart. The stock write above already committed, so a broker
            // failure only costs the alert.
            let result = self
                .bus
                .publish_persistent(
                    topics::products::LOW_STOCK,
                    serde_json::json!({
                        "product_id": product.id,
                        "name": product.name,
                        "stock_level": product.stock_level,
                        "threshold": LOW_STOCK_THRESHOLD,
                    }),
                )
                .await;
            if let Err(e) = result {
                tracing::warn!(product_id = %product.id, error = %e, "Low-stock publish not durable");
            }
        }
    }

    /// Archive in lieu of delete: hidden, forced inactive, name freed for
    /// reuse by the partial unique index.
    #[instrument(skip(self))]
    pub async fn archive_product(&self, id: Uuid) -> Result<Product, CatalogError> {
        let product = Product::archive(&self.pool, id)
            .await?
            .ok_or(CatalogError::ProductNotFound)?;

        tracing::info!(product_id = %product.id, "Product archived");

        self.bus.publish(
            topics::products::UPDATED,
            serde_json::json!({
                "product_id": product.id,
                "name": product.name,
                "archived": true,
            }),
        );

        Ok(product)
    }

    /// Hard delete, permitted only for variant-free products.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<(), CatalogError> {
        let product = self.get_product(id).await?;

        let variant_count = Variant::count_by_product(&self.pool, id).await?;
        if variant_count > 0 {
            return Err(CatalogError::ForeignKey(format!(
                "product has {variant_count} variant(s); archive it instead"
            )));
        }

        Product::delete(&self.pool, id).await?;

        tracing::info!(product_id = %id, "Product deleted");

        self.bus.publish(
            topics::products::DELETED,
            serde_json::json!({
                "product_id": id,
                "name": product.name,
            }),
        );

        Ok(())
    }
}

/// Map a unique violation to a domain conflict, anything else to the
/// standard conversion.
pub(crate) fn map_unique(err: sqlx::Error, conflict: CatalogError) -> CatalogError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return conflict;
        }
    }
    CatalogError::from(err)
}
