// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::warn;

// Layer 3: Internal module imports
use super::traits::{BusError, BusRecord, BusSubscription, MessageBus};

/// Default per-topic channel capacity.
pub const DEFAULT_TOPIC_CAPACITY: usize = 1024;

/// In-process streaming bus.
///
/// Per-topic broadcast channels in a lock-free table. Single-process
/// deployments and tests use this; it preserves per-topic ordering and
/// (like a real broker) may drop history for a subscriber that lags too
/// far behind, which is logged and skipped.
#[derive(Clone)]
pub struct InMemoryBus {
    inner: Arc<InMemoryBusInner>,
}

struct InMemoryBusInner {
    topics: DashMap<String, broadcast::Sender<BusRecord>>,
    capacity: usize,
}

impl InMemoryBus {
    /// Create a bus with the default per-topic capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TOPIC_CAPACITY)
    }

    /// Create a bus with an explicit per-topic capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(InMemoryBusInner {
                topics: DashMap::new(),
                capacity,
            }),
        }
    }

    fn topic_channel(&self, topic: &str) -> broadcast::Sender<BusRecord> {
        self.inner
            .topics
            .entry(topic.to_owned())
            .or_insert_with(|| broadcast::channel(self.inner.capacity).0)
            .clone()
    }

    /// Number of topics that have ever been touched.
    pub fn topic_count(&self) -> usize {
        self.inner.topics.len()
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn publish(&self, record: BusRecord) -> Result<(), BusError> {
        let channel = self.topic_channel(&record.topic);
        // No live subscriber is fine: a hosting service may come up later;
        // at-least-once starts at subscription time for this bus.
        let _ = channel.send(record);
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<Box<dyn BusSubscription>, BusError> {
        let rx = self.topic_channel(topic).subscribe();
        Ok(Box::new(InMemorySubscription {
            topic: topic.to_owned(),
            rx,
        }))
    }
}

struct InMemorySubscription {
    topic: String,
    rx: broadcast::Receiver<BusRecord>,
}

#[async_trait]
impl BusSubscription for InMemorySubscription {
    async fn next(&mut self) -> Option<BusRecord> {
        loop {
            match self.rx.recv().await {
                Ok(record) => return Some(record),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(topic = %self.topic, missed, "bus subscriber lagged, records dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscriber_in_order() {
        let bus = InMemoryBus::new();
        let mut subscription = bus.subscribe("actor-a1").await.unwrap();

        for n in 0..3u8 {
            bus.publish(BusRecord::new("actor-a1", None, vec![n]))
                .await
                .unwrap();
        }

        for n in 0..3u8 {
            let record = subscription.next().await.unwrap();
            assert_eq!(record.payload, vec![n]);
        }
    }

    #[tokio::test]
    async fn test_topics_are_isolated() {
        let bus = InMemoryBus::new();
        let mut sub_a = bus.subscribe("actor-a").await.unwrap();

        bus.publish(BusRecord::new("actor-b", None, vec![1]))
            .await
            .unwrap();
        bus.publish(BusRecord::new("actor-a", None, vec![2]))
            .await
            .unwrap();

        let record = sub_a.next().await.unwrap();
        assert_eq!(record.topic, "actor-a");
        assert_eq!(record.payload, vec![2]);
    }

    #[tokio::test]
    async fn test_publish_without_subscriber_is_ok() {
        let bus = InMemoryBus::new();
        bus.publish(BusRecord::new("actor-ghost", None, vec![]))
            .await
            .unwrap();
        assert_eq!(bus.topic_count(), 1);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_each_get_records() {
        let bus = InMemoryBus::new();
        let mut sub_1 = bus.subscribe("shared").await.unwrap();
        let mut sub_2 = bus.subscribe("shared").await.unwrap();

        bus.publish(BusRecord::new("shared", Some("k".into()), vec![9]))
            .await
            .unwrap();

        assert_eq!(sub_1.next().await.unwrap().payload, vec![9]);
        assert_eq!(sub_2.next().await.unwrap().payload, vec![9]);
    }
}
