//! Streaming-bus transport: trait, in-memory implementation, topic
//! resolution, producer transport and consumer side.

pub mod consumer;
pub mod in_memory;
pub mod topic;
pub mod traits;
pub mod transport;

pub use consumer::{BusConsumer, DeliveryError, LocalDelivery};
pub use in_memory::InMemoryBus;
pub use topic::TopicResolver;
pub use traits::{BusError, BusRecord, BusSubscription, MessageBus};
pub use transport::BusRemoteTransport;
