//! Error types for reconciliation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Reconciliation error variants.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stripe error: {0}")]
    Provider(String),
}

impl IntoResponse for SyncError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            SyncError::Database(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            SyncError::Provider(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SYNC_FAILED"),
        };

        let body = serde_json::json!({
            "message": self.to_string(),
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}
