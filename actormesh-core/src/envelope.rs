// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Layer 3: Internal module imports
use crate::ids::MessageId;

/// Message envelope carried end to end: local mailbox, HTTP control plane
/// and streaming bus all move this exact shape.
///
/// The `message_type` discriminator lets receivers reconstruct the payload
/// through a [`crate::payload::PayloadCodec`] without runtime reflection.
///
/// # Wire Form
///
/// ```json
/// {
///   "type": "city.Ping",
///   "messageId": "3d6c6c2e-...",
///   "timestamp": "2025-01-01T00:00:00Z",
///   "correlationId": null,
///   "payload": { "n": 42 }
/// }
/// ```
///
/// # Example
/// ```rust
/// use actormesh_core::Envelope;
/// use serde_json::json;
///
/// let envelope = Envelope::new("city.Ping", json!({ "n": 42 }))
///     .with_correlation_id("req-7");
///
/// assert_eq!(envelope.message_type, "city.Ping");
/// assert_eq!(envelope.correlation_id.as_deref(), Some("req-7"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Payload type discriminator (fully-qualified name or registered tag)
    #[serde(rename = "type")]
    pub message_type: String,

    /// Unique message id, allocated at construction
    pub message_id: MessageId,

    /// Creation timestamp
    pub timestamp: DateTime<Utc>,

    /// Optional correlation id for request/response tracking
    #[serde(default)]
    pub correlation_id: Option<String>,

    /// Opaque domain payload
    pub payload: Value,
}

impl Envelope {
    /// Create a new envelope with a fresh message id and timestamp.
    pub fn new(message_type: impl Into<String>, payload: Value) -> Self {
        Self {
            message_type: message_type.into(),
            message_id: MessageId::new(),
            timestamp: Utc::now(),
            correlation_id: None,
            payload,
        }
    }

    /// Builder method: set the correlation id.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Builder method: override the message id.
    ///
    /// Used by tests and by receivers replaying a captured wire form.
    pub fn with_message_id(mut self, id: MessageId) -> Self {
        self.message_id = id;
        self
    }

    /// Builder method: override the timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
