//! Shared application state.

use std::sync::Arc;

use sqlx::PgPool;

use crate::metrics::MetricsRegistry;

/// Top-level state handed to app-scoped handlers (metrics exposition).
/// Domain routers carry their own state via extensions.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub metrics: Arc<MetricsRegistry>,
}
