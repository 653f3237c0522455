//! Route-level tests for the webhook endpoint: body cap, signature
//! enforcement, and the always-200 contract for verified payloads.
//!
//! These run against a lazy pool; the exercised paths (reject before
//! verification, acknowledge unknown event types) never touch the database.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use roastery_events::{BusMetrics, EventBus};
use roastery_webhooks::signature::compute_signature;
use roastery_webhooks::{
    webhook_router, WebhookIngestor, WebhookMetrics, WebhookState, MAX_BODY_BYTES,
};

const SECRET: &str = "whsec_route_test";
const TIMESTAMP: &str = "1706400000";

fn test_router() -> axum::Router {
    let pool = sqlx::PgPool::connect_lazy("postgres://localhost/unused")
        .expect("lazy pool never connects eagerly");
    let bus = EventBus::new("test", Arc::new(BusMetrics::unregistered()));
    let state = WebhookState {
        ingestor: Arc::new(WebhookIngestor::new(pool, bus)),
        webhook_secret: SECRET.into(),
        metrics: Arc::new(WebhookMetrics::unregistered()),
    };
    webhook_router(state)
}

fn signed_request(body: Vec<u8>) -> Request<Body> {
    let signature = compute_signature(SECRET, TIMESTAMP, &body);
    Request::builder()
        .method("POST")
        .uri("/stripe")
        .header("Stripe-Signature", format!("t={TIMESTAMP},v1={signature}"))
        .body(Body::from(body))
        .unwrap()
}

/// A payload of exactly `size` bytes that decodes as an unhandled event type.
fn padded_event(size: usize) -> Vec<u8> {
    let skeleton = br#"{"id":"evt_pad","type":"payout.paid","data":{"object":{}},"pad":""}"#;
    assert!(size > skeleton.len());
    let padding = size - skeleton.len();
    let mut body = Vec::with_capacity(size);
    // keep everything up to the open quote of "pad", fill, close
    body.extend_from_slice(&skeleton[..skeleton.len() - 2]);
    body.extend(std::iter::repeat(b'x').take(padding));
    body.extend_from_slice(br#""}"#);
    assert_eq!(body.len(), size);
    body
}

#[tokio::test]
async fn missing_signature_is_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/stripe")
        .body(Body::from(r#"{"id":"evt_1"}"#))
        .unwrap();

    let response = test_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["code"], "INVALID_FORMAT");
}

#[tokio::test]
async fn invalid_signature_is_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/stripe")
        .header("Stripe-Signature", "t=1706400000,v1=deadbeef")
        .body(Body::from(r#"{"id":"evt_1"}"#))
        .unwrap();

    let response = test_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_signature_header_is_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/stripe")
        .header("Stripe-Signature", "not-a-signature")
        .body(Body::from(r#"{"id":"evt_1"}"#))
        .unwrap();

    let response = test_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn verified_unknown_event_type_is_acknowledged() {
    let body = br#"{"id":"evt_1","type":"payout.paid","data":{"object":{}}}"#.to_vec();
    let response = test_router().oneshot(signed_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed["status"], "success");
}

#[tokio::test]
async fn verified_garbage_payload_is_still_acknowledged() {
    let body = b"not json at all".to_vec();
    let response = test_router().oneshot(signed_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn body_at_exactly_the_cap_is_accepted() {
    let body = padded_event(MAX_BODY_BYTES);
    let response = test_router().oneshot(signed_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn body_one_byte_over_the_cap_is_503() {
    let body = padded_event(MAX_BODY_BYTES + 1);
    let response = test_router().oneshot(signed_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let bytes = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed["code"], "SERVICE_UNAVAILABLE");
}
