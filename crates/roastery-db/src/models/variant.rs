//! Variant model: one concrete option combination of a product.
//!
//! A variant is the unit that maps 1:1 to a Stripe product record. Its
//! `options` map selects exactly one value per option key of the parent
//! product. Variants are never hard-deleted in response to provider events;
//! `product.deleted` only deactivates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::BTreeMap;
use uuid::Uuid;

/// A sellable SKU of a product.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Variant {
    pub id: Uuid,

    pub product_id: Uuid,

    /// Local price the variant currently sells at. Null until a price exists.
    pub price_id: Option<Uuid>,

    /// Stripe product identifier backing this variant. Empty while the
    /// variant is queued for export; unique across variants once set.
    pub stripe_product_id: String,

    /// Stripe price identifier, kept in step with `price_id`.
    pub stripe_price_id: String,

    pub active: bool,

    pub stock_level: i32,

    pub weight_grams: i32,

    /// Option key -> selected value, e.g. `weight -> 12oz`.
    pub options: Json<BTreeMap<String, String>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a variant.
#[derive(Debug, Clone, Default)]
pub struct CreateVariant {
    pub product_id: Uuid,
    pub price_id: Option<Uuid>,
    pub stripe_product_id: String,
    pub stripe_price_id: String,
    pub active: bool,
    pub stock_level: i32,
    pub weight_grams: i32,
    pub options: BTreeMap<String, String>,
}

/// Field updates applied by the webhook ingestor on `product.updated`.
#[derive(Debug, Clone)]
pub struct VariantSyncUpdate {
    pub active: bool,
    pub weight_grams: i32,
    pub stock_level: Option<i32>,
    pub options: BTreeMap<String, String>,
}

impl Variant {
    /// Insert a new variant. The partial unique index on `stripe_product_id`
    /// and the `(product_id, options)` uniqueness both apply here.
    pub async fn create(
        pool: &sqlx::PgPool,
        input: &CreateVariant,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r"
            INSERT INTO variants (
                product_id, price_id, stripe_product_id, stripe_price_id,
                active, stock_level, weight_grams, options
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            ",
        )
        .bind(input.product_id)
        .bind(input.price_id)
        .bind(&input.stripe_product_id)
        .bind(&input.stripe_price_id)
        .bind(input.active)
        .bind(input.stock_level)
        .bind(input.weight_grams)
        .bind(Json(&input.options))
        .fetch_one(pool)
        .await
    }

    /// Find a variant by ID.
    pub async fn find_by_id(
        pool: &sqlx::PgPool,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM variants WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the variant backed by a given Stripe product.
    pub async fn find_by_stripe_product_id(
        pool: &sqlx::PgPool,
        stripe_product_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM variants WHERE stripe_product_id = $1 AND stripe_product_id <> ''",
        )
        .bind(stripe_product_id)
        .fetch_optional(pool)
        .await
    }

    /// List all variants of a product.
    pub async fn list_by_product(
        pool: &sqlx::PgPool,
        product_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM variants WHERE product_id = $1 ORDER BY created_at",
        )
        .bind(product_id)
        .fetch_all(pool)
        .await
    }

    /// List variants currently selling at a given price.
    pub async fn list_by_price(
        pool: &sqlx::PgPool,
        price_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM variants WHERE price_id = $1 ORDER BY created_at",
        )
        .bind(price_id)
        .fetch_all(pool)
        .await
    }

    /// Count variants of a product.
    pub async fn count_by_product(
        pool: &sqlx::PgPool,
        product_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM variants WHERE product_id = $1")
                .bind(product_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// Count variants referencing a price. Non-zero blocks price deletion.
    pub async fn count_by_price(
        pool: &sqlx::PgPool,
        price_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM variants WHERE price_id = $1")
                .bind(price_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// True when the product already has a variant with this exact options
    /// combination.
    pub async fn options_exist(
        pool: &sqlx::PgPool,
        product_id: Uuid,
        options: &BTreeMap<String, String>,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            r"
            SELECT EXISTS(
                SELECT 1 FROM variants WHERE product_id = $1 AND options = $2
            )
            ",
        )
        .bind(product_id)
        .bind(Json(options))
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Apply the field updates from a `product.updated` webhook.
    pub async fn apply_sync_update(
        pool: &sqlx::PgPool,
        id: Uuid,
        update: &VariantSyncUpdate,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            UPDATE variants SET
                active = $2,
                weight_grams = $3,
                stock_level = COALESCE($4, stock_level),
                options = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(update.active)
        .bind(update.weight_grams)
        .bind(update.stock_level)
        .bind(Json(&update.options))
        .fetch_optional(pool)
        .await
    }

    /// Deactivate a variant (provider-side delete is soft locally).
    pub async fn deactivate(
        pool: &sqlx::PgPool,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            UPDATE variants SET active = FALSE, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Point the variant at a price, keeping the Stripe price id in step.
    pub async fn assign_price(
        pool: &sqlx::PgPool,
        id: Uuid,
        price_id: Uuid,
        stripe_price_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            UPDATE variants SET
                price_id = $2,
                stripe_price_id = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(price_id)
        .bind(stripe_price_id)
        .fetch_optional(pool)
        .await
    }
}
