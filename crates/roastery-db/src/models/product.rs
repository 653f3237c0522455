//! Product model: the local catalog unit.
//!
//! A product owns its variants and prices. `options` maps an option key
//! (e.g. `weight`) to the ordered list of allowed values; an empty map means
//! the product is not yet configured for variant generation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::BTreeMap;
use uuid::Uuid;

/// A coffee product in the local catalog.
///
/// The catalog is authoritative for product identity and stock; `stripe_id`
/// is a pointer into the provider catalog and may be empty during bootstrap.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,

    /// Stripe product identifier. Empty until the product has been exported
    /// or reconciled.
    pub stripe_id: String,

    /// Display name, unique among non-archived products.
    pub name: String,

    pub description: String,

    pub image_url: String,

    /// Growing origin, e.g. "Ethiopia".
    pub origin: String,

    /// Roast level, e.g. "light", "medium".
    pub roast_level: String,

    pub flavor_notes: Vec<String>,

    pub active: bool,

    /// Archived products are hidden and must not be active.
    pub archived: bool,

    pub allow_subscription: bool,

    pub stock_level: i32,

    pub base_weight_grams: i32,

    /// Option key -> ordered allowed values, e.g. `weight -> [12oz, 3lb]`.
    pub options: Json<BTreeMap<String, Vec<String>>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product.
#[derive(Debug, Clone, Default)]
pub struct CreateProduct {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub origin: String,
    pub roast_level: String,
    pub flavor_notes: Vec<String>,
    pub allow_subscription: bool,
    pub stock_level: i32,
    pub base_weight_grams: i32,
    pub options: BTreeMap<String, Vec<String>>,
}

/// Partial update for a product. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateProduct {
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub origin: Option<String>,
    pub roast_level: Option<String>,
    pub flavor_notes: Option<Vec<String>>,
    pub active: Option<bool>,
    pub allow_subscription: Option<bool>,
    pub stock_level: Option<i32>,
    pub options: Option<BTreeMap<String, Vec<String>>>,
}

impl Product {
    /// Insert a new product. Fails on a duplicate non-archived name via the
    /// partial unique index.
    pub async fn create(
        pool: &sqlx::PgPool,
        input: &CreateProduct,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r"
            INSERT INTO products (
                stripe_id, name, description, image_url, origin, roast_level,
                flavor_notes, active, archived, allow_subscription,
                stock_level, base_weight_grams, options
            )
            VALUES ('', $1, $2, $3, $4, $5, $6, TRUE, FALSE, $7, $8, $9, $10)
            RETURNING *
            ",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(&input.origin)
        .bind(&input.roast_level)
        .bind(&input.flavor_notes)
        .bind(input.allow_subscription)
        .bind(input.stock_level)
        .bind(input.base_weight_grams)
        .bind(Json(&input.options))
        .fetch_one(pool)
        .await
    }

    /// Find a product by ID.
    pub async fn find_by_id(
        pool: &sqlx::PgPool,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a non-archived product by exact name.
    pub async fn find_by_name(
        pool: &sqlx::PgPool,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM products WHERE name = $1 AND NOT archived")
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List products with pagination. When `include_hidden` is false only
    /// active, non-archived products are returned.
    pub async fn list(
        pool: &sqlx::PgPool,
        include_hidden: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        if include_hidden {
            sqlx::query_as(
                "SELECT * FROM products ORDER BY name LIMIT $1 OFFSET $2",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
        } else {
            sqlx::query_as(
                r"
                SELECT * FROM products
                WHERE active AND NOT archived
                ORDER BY name LIMIT $1 OFFSET $2
                ",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
        }
    }

    /// Count all products, including inactive and archived.
    pub async fn count_all(pool: &sqlx::PgPool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Apply a partial update and bump `updated_at`.
    pub async fn update(
        pool: &sqlx::PgPool,
        id: Uuid,
        input: &UpdateProduct,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            UPDATE products SET
                description = COALESCE($2, description),
                image_url = COALESCE($3, image_url),
                origin = COALESCE($4, origin),
                roast_level = COALESCE($5, roast_level),
                flavor_notes = COALESCE($6, flavor_notes),
                active = COALESCE($7, active) AND NOT archived,
                allow_subscription = COALESCE($8, allow_subscription),
                stock_level = COALESCE($9, stock_level),
                options = COALESCE($10, options),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(&input.origin)
        .bind(&input.roast_level)
        .bind(&input.flavor_notes)
        .bind(input.active)
        .bind(input.allow_subscription)
        .bind(input.stock_level)
        .bind(input.options.as_ref().map(Json))
        .fetch_optional(pool)
        .await
    }

    /// Overwrite the Stripe identifier (reconciler repair path).
    pub async fn update_stripe_id(
        pool: &sqlx::PgPool,
        id: Uuid,
        stripe_id: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE products SET stripe_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(stripe_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Archive a product: hidden from listings, forced inactive.
    pub async fn archive(
        pool: &sqlx::PgPool,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            UPDATE products
            SET archived = TRUE, active = FALSE, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Hard-delete a product. Callers must first check no variants remain.
    pub async fn delete(pool: &sqlx::PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Set the absolute stock level.
    pub async fn update_stock_level(
        pool: &sqlx::PgPool,
        id: Uuid,
        stock_level: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            UPDATE products SET stock_level = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(stock_level)
        .fetch_optional(pool)
        .await
    }
}
