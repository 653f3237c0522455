//! Webhook event audit rows.
//!
//! Every decoded Stripe event that reaches a stub handler is recorded here so
//! redeliveries of out-of-scope event types are observable without inventing
//! domain semantics for them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An acknowledged-but-not-applied Stripe event.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub id: Uuid,
    /// Stripe event identifier (`evt_...`).
    pub stripe_event_id: String,
    pub event_type: String,
    pub created_at: DateTime<Utc>,
}

impl WebhookEvent {
    /// Record an event, ignoring redeliveries of the same Stripe event id.
    pub async fn record(
        pool: &sqlx::PgPool,
        stripe_event_id: &str,
        event_type: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r"
            INSERT INTO webhook_events (stripe_event_id, event_type)
            VALUES ($1, $2)
            ON CONFLICT (stripe_event_id) DO NOTHING
            ",
        )
        .bind(stripe_event_id)
        .bind(event_type)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Recent recorded events, newest first.
    pub async fn recent(
        pool: &sqlx::PgPool,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM webhook_events ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
