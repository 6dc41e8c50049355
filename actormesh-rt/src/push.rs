//! Outbound push channels for external observers.
//!
//! A push sink is an abstract sink (a web-socket session, an SSE stream, a
//! test probe) that wants actor output delivered back out of the platform.
//! Sinks are registered per actor id; an actor reaches its own sink through
//! the context. The concrete sink implementation lives outside the core.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

// Layer 3: Internal module imports
use actormesh_core::{ActorId, Envelope};

/// Failure delivering to an external observer.
#[derive(Error, Debug)]
#[error("push delivery failed: {0}")]
pub struct PushError(pub String);

/// An outbound sink delivering envelopes to an interested external
/// observer.
#[async_trait]
pub trait PushSink: Send + Sync {
    /// Deliver one envelope to the observer watching `actor_id`.
    async fn push(&self, actor_id: &ActorId, envelope: &Envelope) -> Result<(), PushError>;
}

/// Registry of push sinks keyed by actor id.
#[derive(Clone, Default)]
pub struct PushRegistry {
    sinks: Arc<DashMap<ActorId, Arc<dyn PushSink>>>,
}

impl PushRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a sink to an actor id, replacing any previous sink.
    pub fn register(&self, actor_id: ActorId, sink: Arc<dyn PushSink>) {
        self.sinks.insert(actor_id, sink);
    }

    /// Detach the sink for an actor id.
    pub fn unregister(&self, actor_id: &ActorId) {
        self.sinks.remove(actor_id);
    }

    /// Sink registered for an actor id, if any.
    pub fn get(&self, actor_id: &ActorId) -> Option<Arc<dyn PushSink>> {
        self.sinks.get(actor_id).map(|entry| Arc::clone(&entry))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    #[derive(Default)]
    struct RecordingSink {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PushSink for RecordingSink {
        async fn push(&self, _actor_id: &ActorId, envelope: &Envelope) -> Result<(), PushError> {
            self.seen.lock().push(envelope.message_type.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_register_and_push() {
        let registry = PushRegistry::new();
        let sink = Arc::new(RecordingSink::default());
        let actor_id = ActorId::new("a-1");

        registry.register(actor_id.clone(), Arc::clone(&sink) as Arc<dyn PushSink>);
        let found = registry.get(&actor_id).unwrap();
        found
            .push(&actor_id, &Envelope::new("x.Update", json!({})))
            .await
            .unwrap();

        assert_eq!(sink.seen.lock().as_slice(), ["x.Update"]);
    }

    #[test]
    fn test_unregister_removes_sink() {
        let registry = PushRegistry::new();
        let actor_id = ActorId::new("a-1");
        registry.register(
            actor_id.clone(),
            Arc::new(RecordingSink::default()) as Arc<dyn PushSink>,
        );

        registry.unregister(&actor_id);
        assert!(registry.get(&actor_id).is_none());
    }
}
