//! Canonical content hashing for sync idempotency.
//!
//! A hash is SHA-256 (lowercase hex) over a compact JSON projection with keys
//! in ascending Unicode order. Projections are built as `BTreeMap`s so the
//! key order is guaranteed by the container, independent of how serde_json's
//! `Map` is configured; arrays are sorted explicitly.
//!
//! The projection key names are part of the stored-hash contract: renaming
//! them invalidates every row in `sync_hashes`.

use std::collections::BTreeMap;

use serde_json::Value;
use sha2::{Digest, Sha256};

use roastery_db::models::Variant;
use roastery_stripe::StripeProduct;

/// Metadata keys excluded from hashing: they describe the sync machinery
/// itself and would make every echo look like a change.
pub const RESERVED_METADATA_KEYS: [&str; 3] = ["sync_hash", "last_sync", "sync_source"];

/// Lowercase hex SHA-256 of raw bytes.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn canonical_hash(projection: &BTreeMap<&str, Value>) -> String {
    let json = serde_json::to_string(projection)
        .expect("projection of plain strings and integers always serializes");
    sha256_hex(json.as_bytes())
}

/// Canonical hash of an inbound Stripe product payload.
#[must_use]
pub fn hash_stripe_product(product: &StripeProduct) -> String {
    let mut images = product.images.clone();
    images.sort();

    let metadata: BTreeMap<&str, &str> = product
        .metadata
        .iter()
        .filter(|(key, _)| !RESERVED_METADATA_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();

    let mut projection: BTreeMap<&str, Value> = BTreeMap::new();
    projection.insert("id", Value::from(product.id.as_str()));
    projection.insert("name", Value::from(product.name.as_str()));
    projection.insert(
        "description",
        Value::from(product.description.clone().unwrap_or_default()),
    );
    projection.insert("active", Value::from(product.active));
    projection.insert("images", Value::from(images));
    projection.insert(
        "metadata",
        serde_json::to_value(metadata).expect("string map always serializes"),
    );

    canonical_hash(&projection)
}

/// Canonical hash of a local variant's synchronized fields.
#[must_use]
pub fn hash_variant(variant: &Variant) -> String {
    let mut projection: BTreeMap<&str, Value> = BTreeMap::new();
    projection.insert(
        "provider_product_id",
        Value::from(variant.stripe_product_id.as_str()),
    );
    projection.insert(
        "provider_price_id",
        Value::from(variant.stripe_price_id.as_str()),
    );
    projection.insert("weight_grams", Value::from(variant.weight_grams));
    projection.insert(
        "options",
        serde_json::to_value(&variant.options.0).expect("string map always serializes"),
    );
    projection.insert("active", Value::from(variant.active));
    projection.insert("stock_level", Value::from(variant.stock_level));

    canonical_hash(&projection)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(metadata: &[(&str, &str)]) -> StripeProduct {
        StripeProduct {
            id: "prod_A".to_string(),
            name: "Ethiopia Yirgacheffe - 12oz".to_string(),
            description: Some("Floral, citrus".to_string()),
            active: true,
            images: vec![
                "https://img/b.png".to_string(),
                "https://img/a.png".to_string(),
            ],
            metadata: metadata
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            created: 1_706_400_000,
        }
    }

    #[test]
    fn hash_is_stable_lowercase_hex() {
        let p = product(&[("weight", "12oz")]);
        let first = hash_stripe_product(&p);
        let second = hash_stripe_product(&p);

        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()));
    }

    #[test]
    fn reserved_metadata_keys_do_not_affect_hash() {
        let base = product(&[("weight", "12oz")]);
        let with_reserved = product(&[
            ("weight", "12oz"),
            ("sync_hash", "aabbcc"),
            ("last_sync", "2026-01-01"),
            ("sync_source", "local_api"),
        ]);

        assert_eq!(
            hash_stripe_product(&base),
            hash_stripe_product(&with_reserved)
        );
    }

    #[test]
    fn image_order_does_not_affect_hash() {
        let mut reordered = product(&[]);
        reordered.images.reverse();

        assert_eq!(
            hash_stripe_product(&product(&[])),
            hash_stripe_product(&reordered)
        );
    }

    #[test]
    fn content_change_changes_hash() {
        let mut changed = product(&[]);
        changed.active = false;

        assert_ne!(
            hash_stripe_product(&product(&[])),
            hash_stripe_product(&changed)
        );
    }

    #[test]
    fn decode_reencode_is_hash_stable() {
        let p = product(&[("weight", "12oz"), ("grind", "whole")]);
        let bytes = serde_json::to_vec(&p).unwrap();
        let reparsed: StripeProduct = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(hash_stripe_product(&p), hash_stripe_product(&reparsed));
    }

    #[test]
    fn canonical_json_keys_are_ascending() {
        let mut projection: BTreeMap<&str, Value> = BTreeMap::new();
        projection.insert("zeta", Value::from(1));
        projection.insert("alpha", Value::from(2));

        let json = serde_json::to_string(&projection).unwrap();
        assert_eq!(json, r#"{"alpha":2,"zeta":1}"#);
    }

    #[test]
    fn variant_hash_covers_synced_fields() {
        use chrono::Utc;
        use sqlx::types::Json;
        use std::collections::BTreeMap;
        use uuid::Uuid;

        let mut options = BTreeMap::new();
        options.insert("weight".to_string(), "12oz".to_string());

        let variant = Variant {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            price_id: None,
            stripe_product_id: "prod_A".to_string(),
            stripe_price_id: "price_X".to_string(),
            active: true,
            stock_level: 4,
            weight_grams: 336,
            options: Json(options),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let baseline = hash_variant(&variant);

        let mut stocked = variant.clone();
        stocked.stock_level = 5;
        assert_ne!(baseline, hash_variant(&stocked));

        // timestamps are not part of the projection
        let mut touched = variant.clone();
        touched.updated_at = Utc::now();
        assert_eq!(baseline, hash_variant(&touched));
    }
}
