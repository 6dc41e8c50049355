// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Layer 3: Internal module imports
use crate::envelope::Envelope;
use crate::ids::{ActorId, ServiceId};
use crate::record::ActorStatus;

/// Opaque creation parameters captured at actor creation.
pub type Params = serde_json::Map<String, Value>;

/// Wire form of a cross-service message delivery.
///
/// Carried by both the HTTP control path (`POST /runtime/tell`) and the
/// streaming-bus path (published on the target's topic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TellCommand {
    /// Actor the envelope is addressed to
    pub target_actor_id: ActorId,

    /// Sending actor, when the message originates from another actor
    #[serde(default)]
    pub sender_actor_id: Option<ActorId>,

    /// The envelope to enqueue
    pub message: Envelope,
}

impl TellCommand {
    /// Create a tell with no sender (external caller).
    pub fn new(target: ActorId, message: Envelope) -> Self {
        Self {
            target_actor_id: target,
            sender_actor_id: None,
            message,
        }
    }

    /// Builder method: record the sending actor.
    pub fn with_sender(mut self, sender: ActorId) -> Self {
        self.sender_actor_id = Some(sender);
        self
    }
}

/// Wire form of an actor creation, as forwarded to a hosting service's
/// `POST /runtime/create-actor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommand {
    /// Factory type string (e.g. "EchoActor")
    pub actor_type: String,

    /// Caller-provided id; the gateway allocates one when absent
    #[serde(default)]
    pub actor_id: Option<ActorId>,

    /// Opaque construction parameters handed to the factory
    #[serde(default)]
    pub params: Params,

    /// Identity of the requester, for audit logging
    #[serde(default)]
    pub requester_id: Option<String>,
}

/// Public API request body for `POST /api/v1/actors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActorRequest {
    /// Hosting service the actor should be created on
    pub service_id: ServiceId,

    /// Factory type string
    pub actor_type: String,

    /// Optional caller-provided id
    #[serde(default)]
    pub actor_id: Option<ActorId>,

    /// Opaque construction parameters
    #[serde(default)]
    pub params: Params,
}

/// Success body returned by a hosting service for a create.
///
/// `state` uses the registry vocabulary: CREATED until the first receive
/// is observed, ACTIVE once running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedActor {
    pub actor_id: ActorId,
    pub actor_type: String,
    pub service_id: ServiceId,
    pub state: ActorStatus,
}

/// Success body for a tell: the outcome is never masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TellOutcome {
    pub delivered: bool,
}

/// Registration body sent by a hosting service to the control plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterServiceRequest {
    pub service_id: ServiceId,
    pub service_url: String,

    /// Actor types this service's factory can instantiate
    #[serde(default)]
    pub supported_actor_types: Option<Vec<String>>,
}

/// Heartbeat body sent on a fixed cadence by every hosting service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatRequest {
    pub service_id: ServiceId,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tell_command_wire_names() {
        let command = TellCommand::new(
            ActorId::new("a-1"),
            Envelope::new("x.Ping", json!({ "n": 1 })),
        )
        .with_sender(ActorId::new("a-2"));

        let value = serde_json::to_value(&command).unwrap();
        assert_eq!(value["targetActorId"], "a-1");
        assert_eq!(value["senderActorId"], "a-2");
        assert!(value["message"].get("messageId").is_some());
    }

    #[test]
    fn test_tell_command_sender_optional_on_wire() {
        let raw = json!({
            "targetActorId": "a-1",
            "message": {
                "type": "x.Ping",
                "messageId": "0a43cf2e-7a60-4c72-9c5e-6d1a32a0b001",
                "timestamp": "2025-01-01T00:00:00Z",
                "correlationId": null,
                "payload": {}
            }
        });

        let command: TellCommand = serde_json::from_value(raw).unwrap();
        assert!(command.sender_actor_id.is_none());
    }

    #[test]
    fn test_create_command_defaults() {
        let raw = json!({ "actorType": "EchoActor" });
        let command: CreateCommand = serde_json::from_value(raw).unwrap();

        assert_eq!(command.actor_type, "EchoActor");
        assert!(command.actor_id.is_none());
        assert!(command.params.is_empty());
        assert!(command.requester_id.is_none());
    }

    #[test]
    fn test_create_request_params_preserved() {
        let raw = json!({
            "serviceId": "capteur-service",
            "actorType": "CapteurActor",
            "params": { "sensorType": "TEMPERATURE" }
        });

        let request: CreateActorRequest = serde_json::from_value(raw).unwrap();
        assert_eq!(request.params["sensorType"], "TEMPERATURE");
    }

    #[test]
    fn test_created_actor_roundtrip() {
        let created = CreatedActor {
            actor_id: ActorId::new("a-1"),
            actor_type: "EchoActor".to_owned(),
            service_id: ServiceId::new("svc"),
            state: ActorStatus::Active,
        };

        let value = serde_json::to_value(&created).unwrap();
        assert_eq!(value["state"], "ACTIVE");

        let back: CreatedActor = serde_json::from_value(value).unwrap();
        assert_eq!(back, created);
    }
}
