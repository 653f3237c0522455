//! Prometheus metrics for the event bus.

use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::Histogram;
use prometheus_client::registry::Registry;

/// Per-topic label.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct TopicLabels {
    pub topic: String,
}

/// Labels for the error counter.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ErrorLabels {
    pub topic: String,
    pub service: String,
    pub error_kind: String,
}

/// Bus metric families: published/received counters, processing-time
/// histogram, error counter, and the active-subscribers gauge.
pub struct BusMetrics {
    pub published: Family<TopicLabels, Counter>,
    pub received: Family<TopicLabels, Counter>,
    pub processing_seconds: Family<TopicLabels, Histogram>,
    pub errors: Family<ErrorLabels, Counter>,
    pub subscribers: Family<TopicLabels, Gauge>,
}

impl BusMetrics {
    /// Create the metric families and register them.
    pub fn register(registry: &mut Registry) -> Self {
        let published = Family::<TopicLabels, Counter>::default();
        let received = Family::<TopicLabels, Counter>::default();
        let processing_seconds =
            Family::<TopicLabels, Histogram>::new_with_constructor(|| {
                Histogram::new(
                    [0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0].into_iter(),
                )
            });
        let errors = Family::<ErrorLabels, Counter>::default();
        let subscribers = Family::<TopicLabels, Gauge>::default();

        registry.register(
            "events_published",
            "Total number of events published",
            published.clone(),
        );
        registry.register(
            "events_received",
            "Total number of events received by subscribers",
            received.clone(),
        );
        registry.register(
            "event_processing_seconds",
            "Subscriber handler processing time in seconds",
            processing_seconds.clone(),
        );
        registry.register(
            "events_errors",
            "Total number of event bus errors",
            errors.clone(),
        );
        registry.register(
            "event_subscribers",
            "Number of active subscribers per topic",
            subscribers.clone(),
        );

        Self {
            published,
            received,
            processing_seconds,
            errors,
            subscribers,
        }
    }

    /// Detached metrics for tests and tools that do not scrape.
    #[must_use]
    pub fn unregistered() -> Self {
        let mut registry = Registry::default();
        Self::register(&mut registry)
    }

    pub(crate) fn record_error(&self, topic: &str, service: &str, kind: &str) {
        self.errors
            .get_or_create(&ErrorLabels {
                topic: topic.to_string(),
                service: service.to_string(),
                error_kind: kind.to_string(),
            })
            .inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_count() {
        let mut registry = Registry::default();
        let metrics = BusMetrics::register(&mut registry);

        metrics
            .published
            .get_or_create(&TopicLabels {
                topic: "variants.created".to_string(),
            })
            .inc();
        metrics.record_error("variants.created", "test", "handler");

        let mut out = String::new();
        prometheus_client::encoding::text::encode(&mut out, &registry).unwrap();
        assert!(out.contains("events_published_total"));
        assert!(out.contains("events_errors_total"));
    }
}
