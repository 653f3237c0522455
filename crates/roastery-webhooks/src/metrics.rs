//! Prometheus metrics for the webhook ingestor.

use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

/// Per-event-type label.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct EventTypeLabels {
    pub event_type: String,
}

/// Labels for the failure counter.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct FailureLabels {
    pub event_type: String,
    pub error_kind: String,
}

/// Ingestor metrics: verified events received, rejected requests, handler
/// failures (which are still acknowledged with 200).
pub struct WebhookMetrics {
    pub received: Family<EventTypeLabels, Counter>,
    pub rejected: Family<FailureLabels, Counter>,
    pub failures: Family<FailureLabels, Counter>,
}

impl WebhookMetrics {
    /// Create the metric families and register them.
    pub fn register(registry: &mut Registry) -> Self {
        let received = Family::<EventTypeLabels, Counter>::default();
        let rejected = Family::<FailureLabels, Counter>::default();
        let failures = Family::<FailureLabels, Counter>::default();

        registry.register(
            "webhook_events_received",
            "Verified webhook events received, by event type",
            received.clone(),
        );
        registry.register(
            "webhook_requests_rejected",
            "Webhook requests rejected before verification",
            rejected.clone(),
        );
        registry.register(
            "webhook_handler_failures",
            "Webhook handler failures (acknowledged with 200)",
            failures.clone(),
        );

        Self {
            received,
            rejected,
            failures,
        }
    }

    /// Detached metrics for tests.
    #[must_use]
    pub fn unregistered() -> Self {
        let mut registry = Registry::default();
        Self::register(&mut registry)
    }

    pub(crate) fn record_received(&self, event_type: &str) {
        self.received
            .get_or_create(&EventTypeLabels {
                event_type: event_type.to_string(),
            })
            .inc();
    }

    pub(crate) fn record_rejected(&self, error_kind: &str) {
        self.rejected
            .get_or_create(&FailureLabels {
                event_type: "unverified".to_string(),
                error_kind: error_kind.to_string(),
            })
            .inc();
    }

    pub(crate) fn record_failure(&self, event_type: &str, error_kind: &str) {
        self.failures
            .get_or_create(&FailureLabels {
                event_type: event_type.to_string(),
                error_kind: error_kind.to_string(),
            })
            .inc();
    }
}
