//! Catalog router configuration.
//!
//! Routes (mounted under `/api/v1`):
//! - `GET|POST /products`, `GET|PUT|DELETE /products/:id`
//! - `POST /products/:id/archive`
//! - `GET /products/:id/variants`, `POST /products/:id/variants/generate`
//! - `GET /products/:id/prices`
//! - `GET|POST /prices`, `GET|PUT|DELETE /prices/:id`, `GET /prices/:id/variants`
//! - `POST /variants/:id/assign-price`

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Extension, Router,
};
use sqlx::PgPool;

use roastery_events::EventBus;
use roastery_stripe::ProviderClient;

use crate::handlers::{
    archive_product_handler, assign_price_handler, create_price_handler,
    create_product_handler, delete_price_handler, delete_product_handler,
    generate_variants_handler, get_price_handler, get_product_handler,
    list_prices_handler, list_products_handler, price_variants_handler,
    product_prices_handler, product_variants_handler, update_price_handler,
    update_product_handler,
};
use crate::services::{PriceService, ProductService, VariantService};

/// Shared state for the catalog routes.
#[derive(Clone)]
pub struct CatalogState {
    pub product_service: Arc<ProductService>,
    pub price_service: Arc<PriceService>,
    pub variant_service: Arc<VariantService>,
}

impl CatalogState {
    /// Wire the services from their collaborators.
    pub fn new(pool: PgPool, bus: EventBus, provider: Arc<dyn ProviderClient>) -> Self {
        Self {
            product_service: Arc::new(ProductService::new(pool.clone(), bus.clone())),
            price_service: Arc::new(PriceService::new(pool.clone(), bus.clone(), provider)),
            variant_service: Arc::new(VariantService::new(pool, bus)),
        }
    }
}

/// Build the catalog router.
pub fn catalog_router(state: CatalogState) -> Router {
    Router::new()
        .route("/products", get(list_products_handler).post(create_product_handler))
        .route(
            "/products/:id",
            get(get_product_handler)
                .put(update_product_handler)
                .delete(delete_product_handler),
        )
        .route("/products/:id/archive", post(archive_product_handler))
        .route("/products/:id/variants/generate", post(generate_variants_handler))
        .route("/products/:id/variants", get(product_variants_handler))
        .route("/products/:id/prices", get(product_prices_handler))
        .route("/prices", get(list_prices_handler).post(create_price_handler))
        .route(
            "/prices/:id",
            get(get_price_handler)
                .put(update_price_handler)
                .delete(delete_price_handler),
        )
        .route("/prices/:id/variants", get(price_variants_handler))
        .route("/variants/:id/assign-price", post(assign_price_handler))
        .layer(Extension(state.product_service))
        .layer(Extension(state.price_service))
        .layer(Extension(state.variant_service))
}
