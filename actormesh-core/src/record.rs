// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::command::Params;
use crate::ids::{ActorId, ServiceId};

/// Registry-visible availability status of an actor.
///
/// This is the control plane's view; the seven-state [`LifecycleState`]
/// machine lives inside the hosting service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorStatus {
    /// Created on a hosting service, first receive not yet observed
    Created,

    /// Hosting service is healthy, actor reachable
    Active,

    /// Hosting service is currently flagged down
    Unavailable,

    /// Explicitly stopped; never flips back on service recovery
    Stopped,
}

/// Local lifecycle state of an actor inside its hosting service.
///
/// Transitions are monotonic within one run:
///
/// ```text
/// Created -> Starting -> Running -> (Restarting -> Running)* -> Stopping -> Stopped
///                           |
///                           v
///                         Failed   (resolved by supervision)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    /// Instance constructed, pre_start not yet run
    Created,

    /// pre_start in progress
    Starting,

    /// Processing messages
    Running,

    /// Supervision decided RESTART; replacing the instance
    Restarting,

    /// Draining; post_stop in progress
    Stopping,

    /// Terminal: stopped cleanly
    Stopped,

    /// Uncaught error in receive, awaiting a supervision directive
    Failed,
}

impl LifecycleState {
    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::Stopped)
    }

    /// Whether the actor is accepting and processing messages.
    pub fn is_active(&self) -> bool {
        matches!(self, LifecycleState::Running)
    }
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self::Created
    }
}

/// Authoritative record of one actor in the central registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRecord {
    pub actor_id: ActorId,
    pub actor_type: String,
    pub service_id: ServiceId,
    pub service_url: String,
    pub status: ActorStatus,
    pub created_at: DateTime<Utc>,

    /// Opaque creation parameters captured for display and re-creation
    #[serde(default)]
    pub properties: Params,
}

/// One registered hosting service as seen by the control plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    pub service_id: ServiceId,
    pub service_url: String,
    pub last_heartbeat: DateTime<Utc>,
    pub healthy: bool,

    #[serde(default)]
    pub supported_actor_types: Option<Vec<String>>,
}

impl ServiceRecord {
    /// Age of the last heartbeat relative to `now`.
    pub fn heartbeat_age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.last_heartbeat)
    }
}

/// Point-in-time health snapshot of one locally hosted actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorHealth {
    pub state: LifecycleState,

    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,

    pub queue_size: u64,

    /// Last uncaught receive error, when the actor has failed
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_casing() {
        assert_eq!(
            serde_json::to_value(ActorStatus::Unavailable).unwrap(),
            json!("UNAVAILABLE")
        );
        assert_eq!(
            serde_json::to_value(LifecycleState::Restarting).unwrap(),
            json!("RESTARTING")
        );
    }

    #[test]
    fn test_lifecycle_predicates() {
        assert!(LifecycleState::Stopped.is_terminal());
        assert!(!LifecycleState::Failed.is_terminal());
        assert!(LifecycleState::Running.is_active());
        assert!(!LifecycleState::Stopping.is_active());
    }

    #[test]
    fn test_actor_record_roundtrip() {
        let record = ActorRecord {
            actor_id: ActorId::new("a-1"),
            actor_type: "CapteurActor".to_owned(),
            service_id: ServiceId::new("capteur-service"),
            service_url: "http://h:8086".to_owned(),
            status: ActorStatus::Active,
            created_at: Utc::now(),
            properties: Params::new(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["serviceUrl"], "http://h:8086");
        assert_eq!(value["status"], "ACTIVE");

        let back: ActorRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_heartbeat_age() {
        let now = Utc::now();
        let record = ServiceRecord {
            service_id: ServiceId::new("svc"),
            service_url: "http://h:1".to_owned(),
            last_heartbeat: now - chrono::Duration::seconds(45),
            healthy: true,
            supported_actor_types: None,
        };

        assert!(record.heartbeat_age(now).num_seconds() >= 45);
    }

    #[test]
    fn test_actor_health_optional_fields() {
        let raw = json!({ "state": "RUNNING", "queueSize": 3 });
        let health: ActorHealth = serde_json::from_value(raw).unwrap();

        assert_eq!(health.state, LifecycleState::Running);
        assert_eq!(health.queue_size, 3);
        assert!(health.last_message_at.is_none());
        assert!(health.error.is_none());
    }
}
