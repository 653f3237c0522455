//! Request payloads.

use serde::Deserialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// Body for `POST /products`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub image_url: String,

    #[serde(default)]
    pub origin: String,

    #[serde(default)]
    pub roast_level: String,

    #[serde(default)]
    pub flavor_notes: Vec<String>,

    #[serde(default)]
    pub allow_subscription: bool,

    #[serde(default)]
    pub stock_level: i32,

    #[serde(default = "default_base_weight")]
    pub base_weight_grams: i32,

    /// Option key -> ordered allowed values.
    #[serde(default)]
    pub options: BTreeMap<String, Vec<String>>,
}

fn default_base_weight() -> i32 {
    340
}

/// Body for `PUT /products/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub origin: Option<String>,
    pub roast_level: Option<String>,
    pub flavor_notes: Option<Vec<String>>,
    pub active: Option<bool>,
    pub allow_subscription: Option<bool>,
    pub stock_level: Option<i32>,
    pub options: Option<BTreeMap<String, Vec<String>>>,
}

/// Body for `POST /prices`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePriceRequest {
    pub product_id: Uuid,

    #[serde(default)]
    pub name: String,

    /// Minor units (cents for USD).
    pub amount: i64,

    pub currency: String,

    /// "one_time" or "recurring".
    #[serde(rename = "type")]
    pub price_type: String,

    pub interval: Option<String>,

    pub interval_count: Option<i32>,
}

/// Body for `PUT /prices/{id}`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePriceRequest {
    pub name: Option<String>,
    pub active: Option<bool>,
}

/// Body for `POST /variants/{id}/assign-price`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignPriceRequest {
    pub price_id: Uuid,
}

/// Pagination/visibility query for list endpoints.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,

    #[serde(default)]
    pub offset: i64,

    /// Include inactive and archived products.
    #[serde(default)]
    pub include_hidden: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
            include_hidden: false,
        }
    }
}

fn default_limit() -> i64 {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_product_minimal_body() {
        let request: CreateProductRequest =
            serde_json::from_str(r#"{"name": "Ethiopia"}"#).unwrap();
        assert_eq!(request.name, "Ethiopia");
        assert_eq!(request.base_weight_grams, 340);
        assert!(request.options.is_empty());
    }

    #[test]
    fn create_price_accepts_camel_case() {
        let request: CreatePriceRequest = serde_json::from_str(
            r#"{
                "productId": "7f4e0000-0000-0000-0000-000000000000",
                "amount": 1500,
                "currency": "USD",
                "type": "recurring",
                "interval": "month",
                "intervalCount": 1
            }"#,
        )
        .unwrap();
        assert_eq!(request.price_type, "recurring");
        assert_eq!(request.interval_count, Some(1));
    }

    #[test]
    fn list_query_defaults() {
        let query: ListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.limit, 50);
        assert_eq!(query.offset, 0);
        assert!(!query.include_hidden);
    }
}
