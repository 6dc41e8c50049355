// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use thiserror::Error;

// Layer 3: Internal module imports
// (none)

/// Bus-level failures.
#[derive(Error, Debug)]
pub enum BusError {
    /// The bus (or one topic channel) is closed
    #[error("bus closed: {0}")]
    Closed(String),

    /// Broker-side failure, passed through from the implementation
    #[error("bus failure: {0}")]
    Broker(String),
}

/// One record on the bus: a topic, an optional partition key, and opaque
/// bytes (serialized tell commands in this platform).
#[derive(Debug, Clone)]
pub struct BusRecord {
    pub topic: String,
    pub key: Option<String>,
    pub payload: Vec<u8>,
}

impl BusRecord {
    /// Create a record.
    pub fn new(topic: impl Into<String>, key: Option<String>, payload: Vec<u8>) -> Self {
        Self {
            topic: topic.into(),
            key,
            payload,
        }
    }
}

/// One live subscription to a topic.
///
/// Ordering is whatever the bus guarantees per topic (per partition for a
/// keyed shared topic); delivery is at-least-once relative to the broker.
#[async_trait]
pub trait BusSubscription: Send {
    /// Next record, or `None` when the subscription ends.
    async fn next(&mut self) -> Option<BusRecord>;
}

/// The streaming-bus contract.
///
/// The platform ships [`super::InMemoryBus`]; external brokers (Kafka,
/// RabbitMQ, ...) integrate by implementing this pair of traits and are
/// otherwise invisible to the rest of the system.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publish a record on its topic.
    async fn publish(&self, record: BusRecord) -> Result<(), BusError>;

    /// Subscribe to a topic.
    async fn subscribe(&self, topic: &str) -> Result<Box<dyn BusSubscription>, BusError>;
}
