// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use dashmap::DashMap;
use tokio::sync::oneshot;

// Layer 3: Internal module imports
use actormesh_core::Envelope;

/// Pending request-reply table keyed by correlation id.
///
/// `ask` registers a oneshot under the outgoing envelope's correlation id;
/// the target actor answers through `ActorContext::reply`, which resolves
/// the entry. Timeouts cancel their registration so abandoned asks do not
/// accumulate.
#[derive(Clone, Default)]
pub struct AskRegistry {
    pending: Arc<DashMap<String, oneshot::Sender<Envelope>>>,
}

impl AskRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pending ask; the receiver completes with the reply.
    pub fn register(&self, correlation_id: impl Into<String>) -> oneshot::Receiver<Envelope> {
        let (tx, rx) = oneshot::channel();
        self.pending.insert(correlation_id.into(), tx);
        rx
    }

    /// Resolve a pending ask with a reply envelope.
    ///
    /// Returns `false` when nobody is waiting on the correlation id.
    pub fn resolve(&self, correlation_id: &str, reply: Envelope) -> bool {
        match self.pending.remove(correlation_id) {
            Some((_, tx)) => tx.send(reply).is_ok(),
            None => false,
        }
    }

    /// Drop a pending ask (timeout or failed send).
    pub fn cancel(&self, correlation_id: &str) {
        self.pending.remove(correlation_id);
    }

    /// Number of asks currently awaiting replies.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_resolve_completes_waiter() {
        let registry = AskRegistry::new();
        let rx = registry.register("corr-1");

        let reply = Envelope::new("x.Pong", json!({ "n": 1 }));
        assert!(registry.resolve("corr-1", reply));

        let received = rx.await.unwrap();
        assert_eq!(received.message_type, "x.Pong");
        assert_eq!(registry.pending_count(), 0);
    }

    #[test]
    fn test_resolve_unknown_correlation_is_false() {
        let registry = AskRegistry::new();
        assert!(!registry.resolve("ghost", Envelope::new("x", json!(null))));
    }

    #[tokio::test]
    async fn test_cancel_drops_waiter() {
        let registry = AskRegistry::new();
        let rx = registry.register("corr-1");
        registry.cancel("corr-1");

        assert!(rx.await.is_err());
        assert!(!registry.resolve("corr-1", Envelope::new("x", json!(null))));
    }
}
