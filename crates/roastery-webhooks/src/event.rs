//! Stripe event envelope decoding and demultiplexing.

use serde::Deserialize;

use roastery_stripe::{StripePrice, StripeProduct};

use crate::error::WebhookError;

/// Outer Stripe event envelope: `{id, type, data: {object}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    pub id: String,

    #[serde(rename = "type")]
    pub event_type: String,

    pub data: EventData,
}

/// The `data` block of a Stripe event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

/// Classified event with its decoded payload.
#[derive(Debug)]
pub enum EventKind {
    ProductCreated(StripeProduct),
    ProductUpdated(StripeProduct),
    ProductDeleted(StripeProduct),
    PriceCreated(StripePrice),
    PriceUpdated(StripePrice),
    PriceDeleted(StripePrice),
    /// Out-of-core namespaces: decoded, recorded, acknowledged.
    Stub,
    /// Anything else: logged and acknowledged.
    Unknown,
}

/// Event-type namespaces handled by the stub path.
///
/// Matching is by prefix, so `subscription_schedule.` must precede
/// `subscription.`.
const STUB_PREFIXES: [&str; 6] = [
    "checkout.session.",
    "person.",
    "subscription_schedule.",
    "customer.",
    "subscription.",
    "invoice.",
];

impl StripeEvent {
    /// Decode the envelope from verified body bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(bytes).map_err(|e| WebhookError::Decode {
            context: "event envelope".to_string(),
            cause: e.to_string(),
        })
    }

    /// Classify the event and decode its inner object.
    pub fn classify(&self) -> Result<EventKind, WebhookError> {
        let decode_product = || -> Result<StripeProduct, WebhookError> {
            serde_json::from_value(self.data.object.clone()).map_err(|e| {
                WebhookError::Decode {
                    context: format!("{} product object", self.event_type),
                    cause: e.to_string(),
                }
            })
        };
        let decode_price = || -> Result<StripePrice, WebhookError> {
            serde_json::from_value(self.data.object.clone()).map_err(|e| {
                WebhookError::Decode {
                    context: format!("{} price object", self.event_type),
                    cause: e.to_string(),
                }
            })
        };

        let kind = match self.event_type.as_str() {
            "product.created" => EventKind::ProductCreated(decode_product()?),
            "product.updated" => EventKind::ProductUpdated(decode_product()?),
            "product.deleted" => EventKind::ProductDeleted(decode_product()?),
            "price.created" => EventKind::PriceCreated(decode_price()?),
            "price.updated" => EventKind::PriceUpdated(decode_price()?),
            "price.deleted" => EventKind::PriceDeleted(decode_price()?),
            other if STUB_PREFIXES.iter().any(|p| other.starts_with(p)) => {
                EventKind::Stub
            }
            _ => EventKind::Unknown,
        };

        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(event_type: &str, object: serde_json::Value) -> StripeEvent {
        serde_json::from_value(serde_json::json!({
            "id": "evt_1",
            "type": event_type,
            "data": {"object": object},
        }))
        .unwrap()
    }

    #[test]
    fn product_created_classifies_with_payload() {
        let e = event(
            "product.created",
            serde_json::json!({"id": "prod_A", "name": "Ethiopia", "active": true}),
        );
        match e.classify().unwrap() {
            EventKind::ProductCreated(p) => assert_eq!(p.id, "prod_A"),
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn price_created_classifies_with_payload() {
        let e = event(
            "price.created",
            serde_json::json!({
                "id": "price_X",
                "product": "prod_A",
                "unit_amount": 1500,
                "currency": "usd"
            }),
        );
        match e.classify().unwrap() {
            EventKind::PriceCreated(p) => {
                assert_eq!(p.product, "prod_A");
                assert_eq!(p.unit_amount, 1500);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn stub_namespaces_match_by_prefix() {
        for t in [
            "checkout.session.completed",
            "customer.created",
            "subscription.updated",
            "subscription_schedule.canceled",
            "invoice.paid",
            "person.updated",
        ] {
            let e = event(t, serde_json::json!({}));
            assert!(matches!(e.classify().unwrap(), EventKind::Stub), "{t}");
        }
    }

    #[test]
    fn unknown_types_are_acknowledged_as_unknown() {
        let e = event("payout.paid", serde_json::json!({}));
        assert!(matches!(e.classify().unwrap(), EventKind::Unknown));
    }

    #[test]
    fn malformed_inner_object_is_a_decode_error() {
        let e = event("product.created", serde_json::json!("not an object"));
        assert!(e.classify().is_err());
    }

    #[test]
    fn envelope_decode_rejects_garbage() {
        assert!(StripeEvent::from_bytes(b"{").is_err());
        assert!(StripeEvent::from_bytes(b"{\"id\": \"evt\"}").is_err());
    }
}
