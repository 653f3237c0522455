//! Stripe value objects.
//!
//! Field shapes mirror the Stripe wire format so the same structs decode
//! API responses and webhook event payloads.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A Stripe product. In this system one Stripe product backs exactly one
/// local variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripeProduct {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default = "default_true")]
    pub active: bool,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub metadata: BTreeMap<String, String>,

    /// Unix creation timestamp.
    #[serde(default)]
    pub created: i64,
}

/// Recurrence block of a Stripe price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripeRecurring {
    pub interval: String,

    #[serde(default = "default_one")]
    pub interval_count: i64,
}

/// A Stripe price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripePrice {
    pub id: String,

    /// Owning Stripe product id (unexpanded reference).
    pub product: String,

    #[serde(default)]
    pub nickname: Option<String>,

    #[serde(default)]
    pub unit_amount: i64,

    #[serde(default)]
    pub currency: String,

    #[serde(default)]
    pub recurring: Option<StripeRecurring>,

    #[serde(default = "default_true")]
    pub active: bool,

    #[serde(default)]
    pub created: i64,
}

/// Paginated list response shape.
#[derive(Debug, Deserialize)]
pub(crate) struct StripeList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,

    #[serde(default)]
    pub has_more: bool,
}

fn default_true() -> bool {
    true
}

fn default_one() -> i64 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_decodes_with_defaults() {
        let product: StripeProduct =
            serde_json::from_str(r#"{"id": "prod_123"}"#).unwrap();
        assert_eq!(product.id, "prod_123");
        assert!(product.active);
        assert!(product.images.is_empty());
        assert!(product.metadata.is_empty());
    }

    #[test]
    fn price_decodes_recurring_block() {
        let price: StripePrice = serde_json::from_str(
            r#"{
                "id": "price_X",
                "product": "prod_A",
                "unit_amount": 1500,
                "currency": "usd",
                "recurring": {"interval": "month", "interval_count": 1}
            }"#,
        )
        .unwrap();

        assert_eq!(price.unit_amount, 1500);
        let recurring = price.recurring.unwrap();
        assert_eq!(recurring.interval, "month");
        assert_eq!(recurring.interval_count, 1);
    }

    #[test]
    fn price_without_recurring_is_one_time() {
        let price: StripePrice = serde_json::from_str(
            r#"{"id": "price_Y", "product": "prod_A", "unit_amount": 900, "currency": "usd"}"#,
        )
        .unwrap();
        assert!(price.recurring.is_none());
    }
}
