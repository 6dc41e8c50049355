// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use tracing::debug;

// Layer 3: Internal module imports
use super::topic::TopicResolver;
use super::traits::{BusRecord, MessageBus};
use actormesh_core::{
    ActorHealth, RemoteAddress, RemoteTransport, TellCommand, TransportError,
};

/// Bus-backed remote transport: the inter-actor data plane.
///
/// `send` serializes the tell command and publishes it on the topic the
/// resolver maps the target to. Everything else is `Unsupported` - a
/// fire-and-forget topic cannot answer existence, health or a synchronous
/// reply; those run over the HTTP control transport.
pub struct BusRemoteTransport {
    bus: Arc<dyn MessageBus>,
    resolver: TopicResolver,
}

impl BusRemoteTransport {
    /// Build over an injected bus and topic strategy.
    pub fn new(bus: Arc<dyn MessageBus>, resolver: TopicResolver) -> Self {
        Self { bus, resolver }
    }
}

#[async_trait]
impl RemoteTransport for BusRemoteTransport {
    async fn send(
        &self,
        target: &RemoteAddress,
        command: TellCommand,
    ) -> Result<(), TransportError> {
        let topic = self.resolver.topic_for(&target.actor_id);
        let key = self.resolver.key_for(&target.actor_id);
        let payload = serde_json::to_vec(&command)?;

        debug!(actor_id = %target.actor_id, %topic, "publishing tell");
        self.bus
            .publish(BusRecord::new(topic, key, payload))
            .await
            .map_err(|error| TransportError::Connection(error.to_string()))
    }

    async fn exists(&self, _target: &RemoteAddress) -> Result<bool, TransportError> {
        Err(TransportError::Unsupported("exists"))
    }

    async fn stop(&self, _target: &RemoteAddress) -> Result<(), TransportError> {
        Err(TransportError::Unsupported("stop"))
    }

    async fn state(&self, _target: &RemoteAddress) -> Result<ActorHealth, TransportError> {
        Err(TransportError::Unsupported("state"))
    }
}
