//! Roastery commerce API server.
//!
//! Wires the catalog REST facade, the Stripe webhook ingestor, the
//! reconciler admin surface, and the event bus behind one axum server.

mod config;
mod consumers;
mod logging;
mod metrics;
mod state;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use config::Config;
use state::AppState;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use roastery_api_catalog::{catalog_router, CatalogState};
use roastery_db::{run_migrations, DbPool};
use roastery_events::{BusMetrics, EventBus};
use roastery_stripe::client_from_secret_key;
use roastery_sync::{admin_router, AdminState, Reconciler};
use roastery_webhooks::{
    webhook_router, WebhookIngestor, WebhookMetrics, WebhookState,
};

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        stripe_live = config.stripe_live(),
        "Starting commerce API"
    );

    // Database
    let db = match DbPool::connect(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Database connection failed");
            std::process::exit(1);
        }
    };
    if let Err(e) = run_migrations(&db).await {
        tracing::error!(error = %e, "Migrations failed");
        std::process::exit(1);
    }
    let pool = db.inner().clone();

    // Metrics registry shared by HTTP middleware, the bus, and the ingestor
    let metrics_registry = Arc::new(metrics::MetricsRegistry::new());
    let bus_metrics = Arc::new(
        metrics_registry.with_registry(|registry| BusMetrics::register(registry)),
    );
    let webhook_metrics = Arc::new(
        metrics_registry.with_registry(|registry| WebhookMetrics::register(registry)),
    );

    // Event bus: durable stream when NATS is configured, transient otherwise.
    // The bus must exist before any component that publishes.
    let bus = match &config.nats_url {
        Some(url) => {
            match EventBus::with_stream("commerce-api", bus_metrics.clone(), url).await {
                Ok(bus) => bus,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Durable stream unavailable, falling back to transient bus"
                    );
                    EventBus::new("commerce-api", bus_metrics)
                }
            }
        }
        None => EventBus::new("commerce-api", bus_metrics),
    };

    consumers::register_observers(&bus);

    // Stripe client (disabled stub when no secret key is configured)
    let provider = client_from_secret_key(&config.stripe_secret_key);

    // Component states
    let catalog_state = CatalogState::new(pool.clone(), bus.clone(), provider.clone());
    let webhook_state = WebhookState {
        ingestor: Arc::new(WebhookIngestor::new(pool.clone(), bus.clone())),
        webhook_secret: config.stripe_webhook_secret.clone().into(),
        metrics: webhook_metrics,
    };
    let admin_state = AdminState {
        pool: pool.clone(),
        reconciler: Arc::new(Reconciler::new(pool.clone(), provider)),
        bus: bus.clone(),
        stripe_live: config.stripe_live(),
    };

    let app_state = AppState {
        db: pool,
        metrics: metrics_registry.clone(),
    };

    let api_v1 = Router::new()
        .merge(catalog_router(catalog_state))
        .nest("/webhooks", webhook_router(webhook_state))
        .nest("/admin", admin_router(admin_state));

    let mut app = Router::new()
        .nest("/api/v1", api_v1)
        .layer(middleware::from_fn_with_state(
            metrics_registry.clone(),
            metrics::metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins));

    // /metrics: separate listener when configured, main router otherwise
    let metrics_route = Router::new()
        .route("/metrics", get(metrics::metrics_handler))
        .with_state(app_state);

    let metrics_server = match &config.metrics_addr {
        Some(addr) => {
            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => listener,
                Err(e) => {
                    tracing::error!(addr = %addr, error = %e, "Failed to bind metrics listener");
                    std::process::exit(1);
                }
            };
            info!(addr = %addr, "Metrics listener bound");
            Some(tokio::spawn(async move {
                if let Err(e) = axum::serve(listener, metrics_route).await {
                    tracing::error!(error = %e, "Metrics server exited");
                }
            }))
        }
        None => {
            app = app.merge(metrics_route);
            None
        }
    };

    let bind_addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %bind_addr, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };

    info!(addr = %bind_addr, "Listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
    }

    // Shutdown order: stop publishers (the server has quiesced), drain the
    // bus, then let the pool drop.
    bus.close().await;
    if let Some(handle) = metrics_server {
        handle.abort();
    }

    info!("Shutdown complete");
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let parsed: Vec<axum::http::HeaderValue> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(parsed)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
