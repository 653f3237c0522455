//! In-process event observers.
//!
//! Downstream projections subscribe here without the emitters knowing.
//! Handlers must be idempotent: delivery is at-least-once.

use async_trait::async_trait;

use roastery_events::{topics, EventBus, EventEnvelope, MessageHandler};

/// Structured audit trail of catalog mutations.
struct CatalogAuditObserver;

#[async_trait]
impl MessageHandler for CatalogAuditObserver {
    async fn handle(
        &self,
        message: &[u8],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let envelope = EventEnvelope::from_json_bytes(message)?;
        tracing::info!(
            target: "catalog_audit",
            event_id = %envelope.id,
            topic = %envelope.topic,
            payload = %envelope.payload,
            "Catalog event"
        );
        Ok(())
    }
}

/// Surfaces low-stock products in the logs until a real notification channel
/// exists.
struct LowStockNotifier;

#[async_trait]
impl MessageHandler for LowStockNotifier {
    async fn handle(
        &self,
        message: &[u8],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let envelope = EventEnvelope::from_json_bytes(message)?;
        tracing::warn!(
            target: "stock_alerts",
            product = %envelope.payload["name"],
            stock_level = %envelope.payload["stock_level"],
            "Low stock"
        );
        Ok(())
    }
}

/// Register the built-in observers.
pub fn register_observers(bus: &EventBus) {
    for topic in [
        topics::products::CREATED,
        topics::products::UPDATED,
        topics::products::DELETED,
        topics::variants::CREATED,
        topics::variants::UPDATED,
        topics::variants::QUEUED,
        topics::variants::DELETED,
        topics::variants::PRICE_ASSIGNED,
        topics::prices::CREATED,
        topics::prices::UPDATED,
        topics::prices::DELETED,
    ] {
        bus.subscribe(topic, CatalogAuditObserver);
    }

    bus.subscribe(topics::products::LOW_STOCK, LowStockNotifier);

    tracing::info!("Event observers registered");
}
