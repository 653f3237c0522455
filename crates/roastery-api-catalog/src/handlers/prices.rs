//! Price endpoints.

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;

use roastery_db::models::{Price, Variant};

use crate::error::CatalogError;
use crate::models::requests::{CreatePriceRequest, ListQuery, UpdatePriceRequest};
use crate::services::PriceService;
use crate::validation::parse_id;

/// List prices with pagination.
#[utoipa::path(
    get,
    path = "/prices",
    params(("limit" = i64, Query), ("offset" = i64, Query)),
    responses((status = 200, description = "Price page")),
    tag = "Prices"
)]
pub async fn list_prices_handler(
    Extension(service): Extension<Arc<PriceService>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Price>>, CatalogError> {
    Ok(Json(service.list_prices(query.limit, query.offset).await?))
}

/// Create a price, originating it in Stripe when possible.
#[utoipa::path(
    post,
    path = "/prices",
    request_body = CreatePriceRequest,
    responses(
        (status = 201, description = "Price created"),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Prices"
)]
pub async fn create_price_handler(
    Extension(service): Extension<Arc<PriceService>>,
    Json(request): Json<CreatePriceRequest>,
) -> Result<(StatusCode, Json<Price>), CatalogError> {
    let price = service.create_price(&request).await?;
    Ok((StatusCode::CREATED, Json(price)))
}

/// Get one price.
#[utoipa::path(
    get,
    path = "/prices/{id}",
    responses(
        (status = 200, description = "Price"),
        (status = 404, description = "Not found"),
    ),
    tag = "Prices"
)]
pub async fn get_price_handler(
    Extension(service): Extension<Arc<PriceService>>,
    Path(id): Path<String>,
) -> Result<Json<Price>, CatalogError> {
    let id = parse_id(&id)?;
    Ok(Json(service.get_price(id).await?))
}

/// Update a price's name or active flag.
#[utoipa::path(
    put,
    path = "/prices/{id}",
    request_body = UpdatePriceRequest,
    responses(
        (status = 200, description = "Price updated"),
        (status = 404, description = "Not found"),
    ),
    tag = "Prices"
)]
pub async fn update_price_handler(
    Extension(service): Extension<Arc<PriceService>>,
    Path(id): Path<String>,
    Json(request): Json<UpdatePriceRequest>,
) -> Result<Json<Price>, CatalogError> {
    let id = parse_id(&id)?;
    Ok(Json(service.update_price(id, &request).await?))
}

/// Delete a price not referenced by any variant.
#[utoipa::path(
    delete,
    path = "/prices/{id}",
    responses(
        (status = 204, description = "Price deleted"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Price in use"),
    ),
    tag = "Prices"
)]
pub async fn delete_price_handler(
    Extension(service): Extension<Arc<PriceService>>,
    Path(id): Path<String>,
) -> Result<StatusCode, CatalogError> {
    let id = parse_id(&id)?;
    service.delete_price(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the variants selling at a price.
#[utoipa::path(
    get,
    path = "/prices/{id}/variants",
    responses(
        (status = 200, description = "Variants"),
        (status = 404, description = "Price not found"),
    ),
    tag = "Prices"
)]
pub async fn price_variants_handler(
    Extension(service): Extension<Arc<PriceService>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Variant>>, CatalogError> {
    let id = parse_id(&id)?;
    Ok(Json(service.variants_for_price(id).await?))
}
