// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

// Layer 3: Internal module imports
use crate::ids::{ActorId, ServiceId};

/// Default capacity of the event broadcast channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// One platform lifecycle event.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformEvent {
    /// When the event occurred
    pub timestamp: DateTime<Utc>,

    /// Specific event type
    #[serde(flatten)]
    pub kind: PlatformEventKind,
}

impl PlatformEvent {
    /// Stamp an event kind with the current time.
    pub fn now(kind: PlatformEventKind) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
        }
    }
}

/// Specific platform event types.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum PlatformEventKind {
    /// An actor record was created
    ActorCreated {
        actor_id: ActorId,
        actor_type: String,
    },

    /// pre_start completed, actor entered RUNNING
    ActorStarted { actor_id: ActorId },

    /// Uncaught error escaped an actor's receive
    ActorFailed { actor_id: ActorId, error: String },

    /// Supervision replaced the actor instance
    ActorRestarted {
        actor_id: ActorId,
        restart_count: u32,
    },

    /// Actor reached STOPPED
    ActorStopped { actor_id: ActorId },

    /// A hosting service registered (or re-registered)
    ServiceRegistered { service_id: ServiceId },

    /// Health monitoring flagged a hosting service down
    ServiceDown { service_id: ServiceId },

    /// A previously down hosting service recovered
    ServiceRecovered { service_id: ServiceId },
}

/// Broadcast bus for platform events.
///
/// Cheap to clone; publishing never blocks and tolerates the absence of
/// subscribers. Every publish is also mirrored to the log at a severity
/// matching the event kind, so event flow is observable without a
/// subscriber.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// Create a bus with the default channel capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Create a bus with an explicit channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event kind stamped with the current time.
    pub fn publish(&self, kind: PlatformEventKind) {
        let event = PlatformEvent::now(kind);
        log_event(&event);
        // Err only means there is no live subscriber right now.
        let _ = self.tx.send(event);
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

fn log_event(event: &PlatformEvent) {
    match &event.kind {
        PlatformEventKind::ActorCreated {
            actor_id,
            actor_type,
        } => debug!(%actor_id, actor_type = %actor_type, "actor created"),
        PlatformEventKind::ActorStarted { actor_id } => info!(%actor_id, "actor started"),
        PlatformEventKind::ActorFailed {
            actor_id,
            error: cause,
        } => error!(%actor_id, cause = %cause, "actor failed"),
        PlatformEventKind::ActorRestarted {
            actor_id,
            restart_count,
        } => warn!(%actor_id, restart_count, "actor restarted"),
        PlatformEventKind::ActorStopped { actor_id } => info!(%actor_id, "actor stopped"),
        PlatformEventKind::ServiceRegistered { service_id } => {
            info!(%service_id, "service registered");
        }
        PlatformEventKind::ServiceDown { service_id } => warn!(%service_id, "service down"),
        PlatformEventKind::ServiceRecovered { service_id } => {
            info!(%service_id, "service recovered");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(PlatformEventKind::ActorStarted {
            actor_id: ActorId::new("a-1"),
        });

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event.kind,
            PlatformEventKind::ActorStarted { .. }
        ));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let bus = EventBus::new();

        // Must not panic or error.
        bus.publish(PlatformEventKind::ServiceDown {
            service_id: ServiceId::new("svc"),
        });
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = PlatformEvent::now(PlatformEventKind::ServiceRecovered {
            service_id: ServiceId::new("svc"),
        });

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "ServiceRecovered");
        assert_eq!(value["service_id"], "svc");
    }
}
