//! Price model: a billable amount, one-time or recurring.
//!
//! Stripe is authoritative for price objects; local rows mirror them and add
//! the product ownership link. Recurring fields are present iff the type is
//! recurring, enforced by a table check constraint and re-validated at the
//! API boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Billing type of a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "price_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PriceType {
    OneTime,
    Recurring,
}

/// Recurrence interval for recurring prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "price_interval", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PriceInterval {
    Week,
    Month,
    Year,
}

impl PriceInterval {
    /// Wire name as used in Stripe payloads ("week", "month", "year").
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceInterval::Week => "week",
            PriceInterval::Month => "month",
            PriceInterval::Year => "year",
        }
    }

    /// Parse a Stripe interval string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "week" => Some(PriceInterval::Week),
            "month" => Some(PriceInterval::Month),
            "year" => Some(PriceInterval::Year),
            _ => None,
        }
    }
}

/// A billable price owned by a product.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Price {
    pub id: Uuid,

    pub product_id: Uuid,

    pub name: String,

    /// Amount in minor units (cents for USD). Always positive.
    pub amount: i64,

    /// ISO-4217 code, uppercase.
    pub currency: String,

    #[serde(rename = "type")]
    pub price_type: PriceType,

    /// Present iff `price_type` is recurring.
    pub recurring_interval: Option<PriceInterval>,

    /// Present iff `price_type` is recurring; 1..=12.
    pub interval_count: Option<i32>,

    pub active: bool,

    /// Stripe price identifier.
    pub stripe_id: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a price.
#[derive(Debug, Clone)]
pub struct CreatePrice {
    pub product_id: Uuid,
    pub name: String,
    pub amount: i64,
    pub currency: String,
    pub price_type: PriceType,
    pub recurring_interval: Option<PriceInterval>,
    pub interval_count: Option<i32>,
    pub active: bool,
    pub stripe_id: String,
}

/// Partial update for a price.
#[derive(Debug, Clone, Default)]
pub struct UpdatePrice {
    pub name: Option<String>,
    pub active: Option<bool>,
    pub stripe_id: Option<String>,
}

impl Price {
    pub async fn create(
        pool: &sqlx::PgPool,
        input: &CreatePrice,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r"
            INSERT INTO prices (
                product_id, name, amount, currency, price_type,
                recurring_interval, interval_count, active, stripe_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            ",
        )
        .bind(input.product_id)
        .bind(&input.name)
        .bind(input.amount)
        .bind(&input.currency)
        .bind(input.price_type)
        .bind(input.recurring_interval)
        .bind(input.interval_count)
        .bind(input.active)
        .bind(&input.stripe_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &sqlx::PgPool,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM prices WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a price by its Stripe identifier.
    pub async fn find_by_stripe_id(
        pool: &sqlx::PgPool,
        stripe_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM prices WHERE stripe_id = $1 AND stripe_id <> ''")
            .bind(stripe_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_product(
        pool: &sqlx::PgPool,
        product_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM prices WHERE product_id = $1 ORDER BY created_at",
        )
        .bind(product_id)
        .fetch_all(pool)
        .await
    }

    pub async fn list(
        pool: &sqlx::PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM prices ORDER BY created_at LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &sqlx::PgPool,
        id: Uuid,
        input: &UpdatePrice,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            UPDATE prices SET
                name = COALESCE($2, name),
                active = COALESCE($3, active),
                stripe_id = COALESCE($4, stripe_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.active)
        .bind(&input.stripe_id)
        .fetch_optional(pool)
        .await
    }

    /// Hard-delete a price. Callers must first check no variant references it.
    pub async fn delete(pool: &sqlx::PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM prices WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_wire_names_round_trip() {
        for (s, interval) in [
            ("week", PriceInterval::Week),
            ("month", PriceInterval::Month),
            ("year", PriceInterval::Year),
        ] {
            assert_eq!(PriceInterval::parse(s), Some(interval));
            assert_eq!(interval.as_str(), s);
        }
        assert_eq!(PriceInterval::parse("day"), None);
    }

    #[test]
    fn price_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&PriceType::OneTime).unwrap(),
            "\"one_time\""
        );
        assert_eq!(
            serde_json::to_string(&PriceType::Recurring).unwrap(),
            "\"recurring\""
        );
    }
}
