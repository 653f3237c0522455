//! Response payloads.
//!
//! Entity responses serialize the db models directly; only list wrappers and
//! composite results get their own shapes.

use serde::Serialize;
use utoipa::ToSchema;

use roastery_db::models::{Product, Variant};

/// Paginated product list.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    #[schema(value_type = Vec<Object>)]
    pub products: Vec<Product>,
    pub limit: i64,
    pub offset: i64,
}

/// Result of `POST /products/{id}/variants/generate`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedVariantsResponse {
    #[schema(value_type = Vec<Object>)]
    pub created: Vec<Variant>,
    /// Option combinations skipped because a variant already existed.
    pub skipped: usize,
}
