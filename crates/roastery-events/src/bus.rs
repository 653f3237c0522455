//! The process-wide event bus.
//!
//! Fan-out is at-least-once: each subscription owns an unbounded channel and
//! a runtime task that invokes its handler serially, so per-topic publish
//! order is preserved per subscription while different subscriptions proceed
//! in parallel. There are no locks held across handler invocations.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::envelope::EventEnvelope;
use crate::error::EventError;
use crate::metrics::{BusMetrics, TopicLabels};
use crate::stream::PersistentStream;

/// Trait for in-process event consumers.
///
/// Handlers receive the raw serialized envelope bytes. A handler must be
/// reentrancy-safe and idempotent: delivery is at-least-once and the same
/// envelope may be seen again after a crash-replay from the durable stream.
#[async_trait]
pub trait MessageHandler: Send + Sync + 'static {
    /// Handle one message. Errors are counted and logged; the subscription
    /// stays active.
    async fn handle(
        &self,
        message: &[u8],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Identifies one subscription for later removal.
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    id: u64,
    topic: String,
}

impl SubscriptionHandle {
    /// Topic this subscription listens on.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

struct Slot {
    id: u64,
    sender: mpsc::UnboundedSender<Vec<u8>>,
}

struct Inner {
    service: String,
    subscriptions: RwLock<HashMap<String, Vec<Slot>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    metrics: Arc<BusMetrics>,
    stream: Option<PersistentStream>,
    closed: AtomicBool,
    next_id: AtomicU64,
}

/// Process-wide publish/subscribe bus. Cheap to clone; all clones share the
/// same subscription set.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Inner>,
}

impl EventBus {
    /// Create a transient-only bus (no durable stream).
    #[must_use]
    pub fn new(service: impl Into<String>, metrics: Arc<BusMetrics>) -> Self {
        Self::build(service.into(), metrics, None)
    }

    /// Create a bus whose persistent topics are appended to NATS JetStream.
    pub async fn with_stream(
        service: impl Into<String>,
        metrics: Arc<BusMetrics>,
        nats_url: &str,
    ) -> Result<Self, EventError> {
        let stream = PersistentStream::connect(nats_url).await?;
        Ok(Self::build(service.into(), metrics, Some(stream)))
    }

    fn build(
        service: String,
        metrics: Arc<BusMetrics>,
        stream: Option<PersistentStream>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                service,
                subscriptions: RwLock::new(HashMap::new()),
                tasks: Mutex::new(Vec::new()),
                metrics,
                stream,
                closed: AtomicBool::new(false),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// True when a durable stream is attached.
    #[must_use]
    pub fn has_stream(&self) -> bool {
        self.inner.stream.is_some()
    }

    /// Publish transiently: best-effort fan-out to in-process subscribers.
    ///
    /// Never fails the caller. Serialization and delivery problems are logged
    /// and counted on the error metric.
    pub fn publish(&self, topic: &str, payload: serde_json::Value) {
        if self.inner.closed.load(Ordering::Acquire) {
            self.inner
                .metrics
                .record_error(topic, &self.inner.service, EventError::Closed.kind());
            tracing::warn!(topic = %topic, "Publish on closed bus dropped");
            return;
        }

        let envelope = EventEnvelope::new(topic, payload);
        let bytes = match envelope.to_json_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                self.inner
                    .metrics
                    .record_error(topic, &self.inner.service, e.kind());
                tracing::error!(topic = %topic, error = %e, "Failed to serialize event");
                return;
            }
        };

        self.inner
            .metrics
            .published
            .get_or_create(&TopicLabels {
                topic: topic.to_string(),
            })
            .inc();

        self.fan_out(topic, &bytes);
    }

    /// Publish to a durable topic: at-least-once append to the JetStream
    /// `events` stream, plus the usual in-process fan-out.
    ///
    /// Returns an error when the stream is unconfigured or the broker did not
    /// ack; the in-process fan-out has already happened in either case, and
    /// callers must not fail their originating write on this error.
    pub async fn publish_persistent(
        &self,
        topic: &str,
        payload: serde_json::Value,
    ) -> Result<(), EventError> {
        if self.inner.closed.load(Ordering::Acquire) {
            self.inner
                .metrics
                .record_error(topic, &self.inner.service, EventError::Closed.kind());
            return Err(EventError::Closed);
        }

        let envelope = EventEnvelope::new(topic, payload);
        let bytes = envelope.to_json_bytes().map_err(|e| {
            self.inner
                .metrics
                .record_error(topic, &self.inner.service, e.kind());
            e
        })?;

        self.inner
            .metrics
            .published
            .get_or_create(&TopicLabels {
                topic: topic.to_string(),
            })
            .inc();

        self.fan_out(topic, &bytes);

        let Some(stream) = &self.inner.stream else {
            self.inner.metrics.record_error(
                topic,
                &self.inner.service,
                EventError::StreamUnavailable.kind(),
            );
            tracing::warn!(topic = %topic, "Durable publish without a configured stream");
            return Err(EventError::StreamUnavailable);
        };

        stream.append(topic, bytes).await.map_err(|e| {
            self.inner
                .metrics
                .record_error(topic, &self.inner.service, e.kind());
            tracing::error!(topic = %topic, error = %e, "Durable append failed");
            e
        })
    }

    fn fan_out(&self, topic: &str, bytes: &[u8]) {
        let subscriptions = self
            .inner
            .subscriptions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let Some(slots) = subscriptions.get(topic) else {
            return;
        };

        for slot in slots {
            if slot.sender.send(bytes.to_vec()).is_err() {
                self.inner
                    .metrics
                    .record_error(topic, &self.inner.service, "send");
                tracing::warn!(
                    topic = %topic,
                    subscription = slot.id,
                    "Subscriber channel closed, message dropped"
                );
            }
        }
    }

    /// Register an in-process consumer for a topic.
    ///
    /// The handler runs on a dedicated runtime task and processes messages
    /// serially in publish order.
    pub fn subscribe<H: MessageHandler>(
        &self,
        topic: &str,
        handler: H,
    ) -> SubscriptionHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, mut receiver) = mpsc::unbounded_channel::<Vec<u8>>();

        let labels = TopicLabels {
            topic: topic.to_string(),
        };
        let metrics = self.inner.metrics.clone();
        let service = self.inner.service.clone();
        let task_topic = topic.to_string();
        let handler = Arc::new(handler);

        let task = tokio::spawn(async move {
            while let Some(bytes) = receiver.recv().await {
                metrics.received.get_or_create(&labels).inc();

                let start = Instant::now();
                if let Err(e) = handler.handle(&bytes).await {
                    metrics.record_error(&task_topic, &service, "handler");
                    tracing::warn!(
                        topic = %task_topic,
                        error = %e,
                        "Event handler failed"
                    );
                }
                metrics
                    .processing_seconds
                    .get_or_create(&labels)
                    .observe(start.elapsed().as_secs_f64());
            }
        });

        {
            let mut subscriptions = self
                .inner
                .subscriptions
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            subscriptions
                .entry(topic.to_string())
                .or_default()
                .push(Slot { id, sender });
        }
        {
            let mut tasks = self
                .inner
                .tasks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            tasks.push(task);
        }

        self.inner
            .metrics
            .subscribers
            .get_or_create(&TopicLabels {
                topic: topic.to_string(),
            })
            .inc();

        tracing::debug!(topic = %topic, subscription = id, "Subscribed");

        SubscriptionHandle {
            id,
            topic: topic.to_string(),
        }
    }

    /// Remove one subscription. Queued messages for it are still processed
    /// before its task exits.
    pub fn unsubscribe(&self, handle: &SubscriptionHandle) {
        let mut subscriptions = self
            .inner
            .subscriptions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(slots) = subscriptions.get_mut(&handle.topic) {
            let before = slots.len();
            slots.retain(|slot| slot.id != handle.id);
            if slots.len() < before {
                self.inner
                    .metrics
                    .subscribers
                    .get_or_create(&TopicLabels {
                        topic: handle.topic.clone(),
                    })
                    .dec();
            }
        }
    }

    /// Close the bus: stop accepting publishes, drain every subscription, and
    /// wait for in-flight handler invocations to complete. Idempotent.
    pub async fn close(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        let drained: Vec<(String, Vec<Slot>)> = {
            let mut subscriptions = self
                .inner
                .subscriptions
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            subscriptions.drain().collect()
        };

        for (topic, slots) in drained {
            for _ in &slots {
                self.inner
                    .metrics
                    .subscribers
                    .get_or_create(&TopicLabels {
                        topic: topic.clone(),
                    })
                    .dec();
            }
            // dropping senders lets each task drain its queue and exit
            drop(slots);
        }

        let tasks: Vec<JoinHandle<()>> = {
            let mut tasks = self
                .inner
                .tasks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            tasks.drain(..).collect()
        };

        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Subscriber task aborted during close");
            }
        }

        tracing::info!("Event bus closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct Recorder {
        seen: Arc<Mutex<Vec<EventEnvelope>>>,
    }

    #[async_trait]
    impl MessageHandler for Recorder {
        async fn handle(
            &self,
            message: &[u8],
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            let envelope = EventEnvelope::from_json_bytes(message)?;
            self.seen.lock().unwrap().push(envelope);
            Ok(())
        }
    }

    struct Failing {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl MessageHandler for Failing {
        async fn handle(
            &self,
            _message: &[u8],
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err("boom".into())
        }
    }

    fn test_bus() -> EventBus {
        EventBus::new("test", Arc::new(BusMetrics::unregistered()))
    }

    #[tokio::test]
    async fn publish_reaches_subscriber_in_order() {
        let bus = test_bus();
        let seen = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe("variants.created", Recorder { seen: seen.clone() });

        for n in 0..5 {
            bus.publish("variants.created", serde_json::json!({"n": n}));
        }
        bus.close().await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 5);
        for (n, envelope) in seen.iter().enumerate() {
            assert_eq!(envelope.topic, "variants.created");
            assert_eq!(envelope.payload["n"], n);
        }
    }

    #[tokio::test]
    async fn topics_are_isolated() {
        let bus = test_bus();
        let seen = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe("prices.created", Recorder { seen: seen.clone() });

        bus.publish("variants.created", serde_json::json!({}));
        bus.publish("prices.created", serde_json::json!({"hit": true}));
        bus.close().await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].topic, "prices.created");
    }

    #[tokio::test]
    async fn handler_error_keeps_subscription_alive() {
        let bus = test_bus();
        let calls = Arc::new(AtomicUsize::new(0));
        bus.subscribe("products.updated", Failing { calls: calls.clone() });

        bus.publish("products.updated", serde_json::json!({}));
        bus.publish("products.updated", serde_json::json!({}));
        bus.close().await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let bus = test_bus();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handle =
            bus.subscribe("variants.updated", Recorder { seen: seen.clone() });

        bus.publish("variants.updated", serde_json::json!({"n": 1}));
        bus.unsubscribe(&handle);
        bus.publish("variants.updated", serde_json::json!({"n": 2}));
        bus.close().await;

        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn close_is_idempotent_and_rejects_publishes() {
        let bus = test_bus();
        bus.close().await;
        bus.close().await;
        // dropped silently, no panic
        bus.publish("variants.created", serde_json::json!({}));
    }

    #[tokio::test]
    async fn persistent_without_stream_errors_but_fans_out() {
        let bus = test_bus();
        let seen = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe("variants.created", Recorder { seen: seen.clone() });

        let result = bus
            .publish_persistent("variants.created", serde_json::json!({"n": 1}))
            .await;
        assert!(matches!(result, Err(EventError::StreamUnavailable)));

        bus.close().await;
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
