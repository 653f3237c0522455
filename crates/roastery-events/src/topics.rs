//! Canonical topic names.
//!
//! Topic strings are dot-separated `<entity>.<action>`. Publishers must use
//! these constants; free-form topic strings make the metrics cardinality
//! unbounded.

/// Product lifecycle topics.
pub mod products {
    pub const CREATED: &str = "products.created";
    pub const UPDATED: &str = "products.updated";
    pub const DELETED: &str = "products.deleted";
    pub const STOCK_UPDATED: &str = "products.stock_updated";
    pub const LOW_STOCK: &str = "products.low_stock";
}

/// Variant lifecycle topics.
pub mod variants {
    pub const CREATED: &str = "variants.created";
    pub const UPDATED: &str = "variants.updated";
    /// Variant created locally and awaiting export to Stripe.
    pub const QUEUED: &str = "variants.queued";
    pub const DELETED: &str = "variants.deleted";
    pub const PRICE_ASSIGNED: &str = "variants.price_assigned";
}

/// Price lifecycle topics.
pub mod prices {
    pub const CREATED: &str = "prices.created";
    pub const UPDATED: &str = "prices.updated";
    pub const DELETED: &str = "prices.deleted";
}

/// Reserved for future use.
pub mod customers {
    pub const CREATED: &str = "customers.created";
    pub const UPDATED: &str = "customers.updated";
}

/// Reserved for future use.
pub mod subscriptions {
    pub const CREATED: &str = "subscriptions.created";
    pub const UPDATED: &str = "subscriptions.updated";
    pub const CANCELLED: &str = "subscriptions.cancelled";
}

/// Reserved for future use.
pub mod orders {
    pub const CREATED: &str = "orders.created";
    pub const COMPLETED: &str = "orders.completed";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_follow_entity_action_shape() {
        for topic in [
            products::CREATED,
            products::LOW_STOCK,
            variants::QUEUED,
            variants::PRICE_ASSIGNED,
            prices::DELETED,
            subscriptions::CANCELLED,
        ] {
            let mut parts = topic.splitn(2, '.');
            assert!(parts.next().is_some_and(|s| !s.is_empty()));
            assert!(parts.next().is_some_and(|s| !s.is_empty()));
        }
    }
}
