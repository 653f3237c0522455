//! SyncHash model: the idempotency oracle of the sync engine.
//!
//! One row per (variant, Stripe product) pair records the content hash of the
//! last payload the ingestor or reconciler accepted and committed. The unique
//! composite constraint serializes concurrent writers; every upsert also
//! appends to `sync_hash_history` for audit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Origin of a synchronized payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "sync_source", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SyncSource {
    ProviderWebhook,
    LocalApi,
    Reconciler,
}

impl SyncSource {
    /// Wire name, e.g. for event payload `update_source` fields.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncSource::ProviderWebhook => "provider_webhook",
            SyncSource::LocalApi => "local_api",
            SyncSource::Reconciler => "reconciler",
        }
    }
}

/// The latest accepted content hash for a (variant, Stripe product) pair.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SyncHash {
    pub id: Uuid,
    pub variant_id: Uuid,
    pub stripe_product_id: String,
    /// Lowercase hex digest.
    pub content_hash: String,
    /// Digest algorithm, currently always "SHA-256".
    pub algorithm: String,
    pub sync_source: SyncSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for recording a newly accepted payload hash.
#[derive(Debug, Clone)]
pub struct SyncHashRecord {
    pub variant_id: Uuid,
    pub stripe_product_id: String,
    pub content_hash: String,
    pub algorithm: String,
    pub sync_source: SyncSource,
}

impl SyncHashRecord {
    /// Convenience constructor for the default SHA-256 algorithm.
    #[must_use]
    pub fn sha256(
        variant_id: Uuid,
        stripe_product_id: impl Into<String>,
        content_hash: impl Into<String>,
        sync_source: SyncSource,
    ) -> Self {
        Self {
            variant_id,
            stripe_product_id: stripe_product_id.into(),
            content_hash: content_hash.into(),
            algorithm: "SHA-256".to_string(),
            sync_source,
        }
    }
}

impl SyncHash {
    /// Insert or overwrite the hash for a (variant, Stripe product) pair and
    /// append the accepted record to the history table.
    ///
    /// Last-writer-wins under concurrency: the composite unique constraint
    /// serializes racing upserts, so the stored hash always reflects exactly
    /// the payload whose apply committed last.
    pub async fn upsert(
        pool: &sqlx::PgPool,
        record: &SyncHashRecord,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let row: Self = sqlx::query_as(
            r"
            INSERT INTO sync_hashes (
                variant_id, stripe_product_id, content_hash, algorithm, sync_source
            )
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (variant_id, stripe_product_id) DO UPDATE SET
                content_hash = EXCLUDED.content_hash,
                algorithm = EXCLUDED.algorithm,
                sync_source = EXCLUDED.sync_source,
                updated_at = NOW()
            RETURNING *
            ",
        )
        .bind(record.variant_id)
        .bind(&record.stripe_product_id)
        .bind(&record.content_hash)
        .bind(&record.algorithm)
        .bind(record.sync_source)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO sync_hash_history (
                variant_id, stripe_product_id, content_hash, algorithm, sync_source
            )
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(record.variant_id)
        .bind(&record.stripe_product_id)
        .bind(&record.content_hash)
        .bind(&record.algorithm)
        .bind(record.sync_source)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Latest hash for an exact (variant, Stripe product) pair.
    pub async fn get_latest(
        pool: &sqlx::PgPool,
        variant_id: Uuid,
        stripe_product_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM sync_hashes
            WHERE variant_id = $1 AND stripe_product_id = $2
            ",
        )
        .bind(variant_id)
        .bind(stripe_product_id)
        .fetch_optional(pool)
        .await
    }

    /// Most recently updated hash for a variant, across provider products.
    pub async fn get_latest_by_variant(
        pool: &sqlx::PgPool,
        variant_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM sync_hashes
            WHERE variant_id = $1
            ORDER BY updated_at DESC
            LIMIT 1
            ",
        )
        .bind(variant_id)
        .fetch_optional(pool)
        .await
    }

    /// Most recently updated hash for a Stripe product, across variants.
    pub async fn get_latest_by_provider(
        pool: &sqlx::PgPool,
        stripe_product_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM sync_hashes
            WHERE stripe_product_id = $1
            ORDER BY updated_at DESC
            LIMIT 1
            ",
        )
        .bind(stripe_product_id)
        .fetch_optional(pool)
        .await
    }

    /// Remove all hashes for a variant (cascade path on variant deletion).
    pub async fn delete_by_variant(
        pool: &sqlx::PgPool,
        variant_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sync_hashes WHERE variant_id = $1")
            .bind(variant_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Audit history for a variant, newest first.
    pub async fn history(
        pool: &sqlx::PgPool,
        variant_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT id, variant_id, stripe_product_id, content_hash, algorithm,
                   sync_source, created_at, created_at AS updated_at
            FROM sync_hash_history
            WHERE variant_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            ",
        )
        .bind(variant_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_source_wire_names() {
        assert_eq!(SyncSource::ProviderWebhook.as_str(), "provider_webhook");
        assert_eq!(SyncSource::LocalApi.as_str(), "local_api");
        assert_eq!(SyncSource::Reconciler.as_str(), "reconciler");
    }

    #[test]
    fn sync_source_serde_matches_wire() {
        assert_eq!(
            serde_json::to_string(&SyncSource::ProviderWebhook).unwrap(),
            "\"provider_webhook\""
        );
        let parsed: SyncSource = serde_json::from_str("\"reconciler\"").unwrap();
        assert_eq!(parsed, SyncSource::Reconciler);
    }

    #[test]
    fn sha256_record_defaults_algorithm() {
        let record = SyncHashRecord::sha256(
            Uuid::nil(),
            "prod_123",
            "abcd",
            SyncSource::LocalApi,
        );
        assert_eq!(record.algorithm, "SHA-256");
        assert_eq!(record.stripe_product_id, "prod_123");
    }
}
