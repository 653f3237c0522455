//! Prometheus metrics collection and exposition.
//!
//! HTTP request metrics (counter + duration histogram) labeled by method,
//! route pattern, and status, plus a `/metrics` endpoint. Database pool
//! gauges are collected on-demand at scrape time.

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family, histogram::Histogram},
    registry::Registry,
};
use std::sync::{Arc, Mutex};

use crate::state::AppState;

/// Labels for HTTP request metrics.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct HttpRequestLabels {
    pub method: String,
    pub route: String,
    pub status: u16,
}

/// HTTP metrics: request counter and duration histogram.
pub struct HttpMetrics {
    pub requests_total: Family<HttpRequestLabels, Counter>,
    pub request_duration_seconds: Family<HttpRequestLabels, Histogram>,
}

impl HttpMetrics {
    fn new() -> Self {
        Self {
            requests_total: Family::default(),
            request_duration_seconds: Family::new_with_constructor(|| {
                Histogram::new(
                    [
                        0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
                    ]
                    .into_iter(),
                )
            }),
        }
    }
}

/// Central registry owning every metric family (HTTP, bus, webhooks).
pub struct MetricsRegistry {
    pub registry: Mutex<Registry>,
    pub http: Arc<HttpMetrics>,
}

impl MetricsRegistry {
    /// Create the registry with the HTTP families registered. Bus and
    /// webhook families register themselves via [`MetricsRegistry::with_registry`].
    pub fn new() -> Self {
        let mut registry = Registry::default();
        let http = Arc::new(HttpMetrics::new());

        registry.register(
            "http_requests",
            "Total number of HTTP requests",
            http.requests_total.clone(),
        );
        registry.register(
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
            http.request_duration_seconds.clone(),
        );

        Self {
            registry: Mutex::new(registry),
            http,
        }
    }

    /// Run a registration closure against the inner registry.
    pub fn with_registry<T>(&self, register: impl FnOnce(&mut Registry) -> T) -> T {
        let mut registry = self.registry.lock().unwrap();
        register(&mut registry)
    }
}

/// Axum middleware recording request count and duration per matched route.
pub async fn metrics_middleware(
    State(metrics): State<Arc<MetricsRegistry>>,
    matched_path: Option<MatchedPath>,
    request: axum::http::Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let route = matched_path
        .as_ref()
        .map_or_else(|| "unmatched".to_string(), |m| m.as_str().to_string());

    let start = std::time::Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed().as_secs_f64();

    let labels = HttpRequestLabels {
        method,
        route,
        status: response.status().as_u16(),
    };

    metrics.http.requests_total.get_or_create(&labels).inc();
    metrics
        .http
        .request_duration_seconds
        .get_or_create(&labels)
        .observe(duration);

    response
}

/// Handler for `GET /metrics` in Prometheus text exposition format.
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut buf = String::new();

    {
        let registry = state.metrics.registry.lock().unwrap();
        if let Err(e) = prometheus_client::encoding::text::encode(&mut buf, &registry) {
            tracing::error!(error = %e, "Failed to encode metrics");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics",
            )
                .into_response();
        }
    }

    // pool gauges are cheap to read, so they are sampled at scrape time
    let pool = &state.db;
    let pool_size = i64::from(pool.size());
    let pool_idle = pool.num_idle() as i64;
    let pool_active = pool_size - pool_idle;

    use std::fmt::Write;
    let _ = writeln!(
        buf,
        "# HELP db_pool_connections_active Number of active database connections"
    );
    let _ = writeln!(buf, "# TYPE db_pool_connections_active gauge");
    let _ = writeln!(buf, "db_pool_connections_active {pool_active}");
    let _ = writeln!(
        buf,
        "# HELP db_pool_connections_idle Number of idle database connections"
    );
    let _ = writeln!(buf, "# TYPE db_pool_connections_idle gauge");
    let _ = writeln!(buf, "db_pool_connections_idle {pool_idle}");

    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        buf,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_creation_and_labels() {
        let registry = MetricsRegistry::new();
        let labels = HttpRequestLabels {
            method: "GET".to_string(),
            route: "/api/v1/products".to_string(),
            status: 200,
        };
        registry.http.requests_total.get_or_create(&labels).inc();
        registry
            .http
            .request_duration_seconds
            .get_or_create(&labels)
            .observe(0.05);
    }
}
