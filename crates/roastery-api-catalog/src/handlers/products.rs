//! Product endpoints.

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;

use roastery_db::models::{Price, Product};

use crate::error::CatalogError;
use crate::models::requests::{CreateProductRequest, ListQuery, UpdateProductRequest};
use crate::models::responses::ProductListResponse;
use crate::services::{PriceService, ProductService};
use crate::validation::parse_id;

/// List products with pagination.
#[utoipa::path(
    get,
    path = "/products",
    params(("limit" = i64, Query), ("offset" = i64, Query), ("includeHidden" = bool, Query)),
    responses((status = 200, description = "Product page", body = ProductListResponse)),
    tag = "Products"
)]
pub async fn list_products_handler(
    Extension(service): Extension<Arc<ProductService>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ProductListResponse>, CatalogError> {
    let products = service.list_products(&query).await?;
    Ok(Json(ProductListResponse {
        products,
        limit: query.limit,
        offset: query.offset,
    }))
}

/// Create a product.
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created"),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Duplicate product name"),
    ),
    tag = "Products"
)]
pub async fn create_product_handler(
    Extension(service): Extension<Arc<ProductService>>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), CatalogError> {
    let product = service.create_product(&request).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Get one product.
#[utoipa::path(
    get,
    path = "/products/{id}",
    responses(
        (status = 200, description = "Product"),
        (status = 404, description = "Not found"),
    ),
    tag = "Products"
)]
pub async fn get_product_handler(
    Extension(service): Extension<Arc<ProductService>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, CatalogError> {
    let id = parse_id(&id)?;
    Ok(Json(service.get_product(id).await?))
}

/// Update a product.
#[utoipa::path(
    put,
    path = "/products/{id}",
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated"),
        (status = 404, description = "Not found"),
    ),
    tag = "Products"
)]
pub async fn update_product_handler(
    Extension(service): Extension<Arc<ProductService>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<Product>, CatalogError> {
    let id = parse_id(&id)?;
    Ok(Json(service.update_product(id, &request).await?))
}

/// Hard-delete a variant-free product.
#[utoipa::path(
    delete,
    path = "/products/{id}",
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Product still has variants"),
    ),
    tag = "Products"
)]
pub async fn delete_product_handler(
    Extension(service): Extension<Arc<ProductService>>,
    Path(id): Path<String>,
) -> Result<StatusCode, CatalogError> {
    let id = parse_id(&id)?;
    service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Archive a product (soft delete).
#[utoipa::path(
    post,
    path = "/products/{id}/archive",
    responses(
        (status = 200, description = "Product archived"),
        (status = 404, description = "Not found"),
    ),
    tag = "Products"
)]
pub async fn archive_product_handler(
    Extension(service): Extension<Arc<ProductService>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, CatalogError> {
    let id = parse_id(&id)?;
    Ok(Json(service.archive_product(id).await?))
}

/// List a product's prices.
#[utoipa::path(
    get,
    path = "/products/{id}/prices",
    responses(
        (status = 200, description = "Prices"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn product_prices_handler(
    Extension(service): Extension<Arc<PriceService>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Price>>, CatalogError> {
    let id = parse_id(&id)?;
    Ok(Json(service.list_by_product(id).await?))
}
