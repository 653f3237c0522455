//! Variant endpoints.

use axum::{extract::Path, http::StatusCode, Extension, Json};
use std::sync::Arc;

use roastery_db::models::Variant;

use crate::error::CatalogError;
use crate::models::requests::AssignPriceRequest;
use crate::models::responses::GeneratedVariantsResponse;
use crate::services::VariantService;
use crate::validation::parse_id;

/// List a product's variants.
#[utoipa::path(
    get,
    path = "/products/{id}/variants",
    responses(
        (status = 200, description = "Variants"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Variants"
)]
pub async fn product_variants_handler(
    Extension(service): Extension<Arc<VariantService>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Variant>>, CatalogError> {
    let id = parse_id(&id)?;
    Ok(Json(service.list_for_product(id).await?))
}

/// Generate variants from the product's option matrix.
#[utoipa::path(
    post,
    path = "/products/{id}/variants/generate",
    responses(
        (status = 201, description = "Variants generated", body = GeneratedVariantsResponse),
        (status = 400, description = "No options configured"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Variants"
)]
pub async fn generate_variants_handler(
    Extension(service): Extension<Arc<VariantService>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<GeneratedVariantsResponse>), CatalogError> {
    let id = parse_id(&id)?;
    let generated = service.generate_variants(id).await?;
    Ok((StatusCode::CREATED, Json(generated)))
}

/// Bind a price to a variant.
#[utoipa::path(
    post,
    path = "/variants/{id}/assign-price",
    request_body = AssignPriceRequest,
    responses(
        (status = 200, description = "Price assigned"),
        (status = 400, description = "Price belongs to a different product"),
        (status = 404, description = "Variant or price not found"),
    ),
    tag = "Variants"
)]
pub async fn assign_price_handler(
    Extension(service): Extension<Arc<VariantService>>,
    Path(id): Path<String>,
    Json(request): Json<AssignPriceRequest>,
) -> Result<Json<Variant>, CatalogError> {
    let id = parse_id(&id)?;
    Ok(Json(service.assign_price(id, request.price_id).await?))
}
