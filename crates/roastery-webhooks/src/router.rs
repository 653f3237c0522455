//! Webhook HTTP surface.
//!
//! One route: `POST /stripe` (mounted under `/api/v1/webhooks`). Responses
//! before signature verification use the standard error envelope; after
//! verification every outcome is `200 {"status":"success"}` so Stripe never
//! retries a payload we have durably accepted.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Extension, Json, Router,
};

use crate::ingestor::WebhookIngestor;
use crate::metrics::WebhookMetrics;
use crate::signature::verify_signature;
use crate::StripeEvent;

/// Request body cap. A body of exactly this size is accepted; one byte more
/// fails the read and returns 503 so Stripe redelivers later.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared state for the webhook routes.
#[derive(Clone)]
pub struct WebhookState {
    pub ingestor: Arc<WebhookIngestor>,
    pub webhook_secret: Arc<str>,
    pub metrics: Arc<WebhookMetrics>,
}

/// Build the webhook router.
pub fn webhook_router(state: WebhookState) -> Router {
    Router::new()
        .route("/stripe", post(stripe_webhook_handler))
        .layer(Extension(state))
}

async fn stripe_webhook_handler(
    Extension(state): Extension<WebhookState>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            state.metrics.record_rejected("body_read");
            tracing::warn!(error = %e, "Webhook body read failed or exceeded cap");
            return error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "Request body could not be read",
            );
        }
    };

    let Some(signature) = headers
        .get("Stripe-Signature")
        .and_then(|value| value.to_str().ok())
    else {
        state.metrics.record_rejected("missing_signature");
        tracing::warn!("Webhook request without Stripe-Signature header");
        return error_response(
            StatusCode::BAD_REQUEST,
            "INVALID_FORMAT",
            "Missing Stripe-Signature header",
        );
    };

    if !verify_signature(signature, &state.webhook_secret, &bytes) {
        state.metrics.record_rejected("invalid_signature");
        tracing::warn!("Webhook signature verification failed");
        return error_response(
            StatusCode::BAD_REQUEST,
            "INVALID_FORMAT",
            "Invalid webhook signature",
        );
    }

    // from here on the payload came from Stripe; all failures are internal
    let event = match StripeEvent::from_bytes(&bytes) {
        Ok(event) => event,
        Err(e) => {
            state.metrics.record_failure("unknown", e.kind());
            tracing::error!(error = %e, "Verified webhook payload failed to decode");
            return ack();
        }
    };

    state.metrics.record_received(&event.event_type);

    if let Err(e) = state.ingestor.dispatch(&event).await {
        state.metrics.record_failure(&event.event_type, e.kind());
        tracing::error!(
            event_id = %event.id,
            event_type = %event.event_type,
            error = %e,
            "Webhook handler failed, acknowledging anyway"
        );
    }

    ack()
}

fn ack() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({"status": "success"})),
    )
        .into_response()
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({"message": message, "code": code})),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_cap_is_64_kib() {
        assert_eq!(MAX_BODY_BYTES, 65536);
    }
}
