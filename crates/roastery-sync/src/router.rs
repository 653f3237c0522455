//! Admin HTTP surface: health probe and the manual reconciliation trigger.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;

use roastery_events::EventBus;

use crate::error::SyncError;
use crate::report::SyncReport;
use crate::service::Reconciler;

/// Shared state for the admin routes.
#[derive(Clone)]
pub struct AdminState {
    pub pool: PgPool,
    pub reconciler: Arc<Reconciler>,
    pub bus: EventBus,
    /// False when running with the disabled stub client.
    pub stripe_live: bool,
}

/// Build the admin router (mounted under `/api/v1/admin`).
pub fn admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/sync-stripe-ids", post(sync_stripe_ids_handler))
        .layer(Extension(state))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
    event_stream: &'static str,
    stripe: &'static str,
}

async fn health_handler(Extension(state): Extension<AdminState>) -> Response {
    let database_up = sqlx::query("SELECT 1")
        .execute(&state.pool)
        .await
        .is_ok();

    let body = HealthResponse {
        status: if database_up { "ok" } else { "degraded" },
        database: if database_up { "up" } else { "down" },
        event_stream: if state.bus.has_stream() {
            "connected"
        } else {
            "transient_only"
        },
        stripe: if state.stripe_live { "live" } else { "disabled" },
    };

    let status = if database_up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(body)).into_response()
}

async fn sync_stripe_ids_handler(
    Extension(state): Extension<AdminState>,
) -> Result<Json<SyncReport>, SyncError> {
    tracing::info!("Manual Stripe id reconciliation triggered");
    let report = state.reconciler.sync_stripe_ids().await?;
    Ok(Json(report))
}
