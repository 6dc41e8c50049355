// Layer 1: Standard library imports
use std::fmt::{self, Display};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Layer 3: Internal module imports
// (none)

/// Unique identifier for actors across the platform.
///
/// Actor ids are stable strings: either allocated as a UUID v4 at creation
/// or supplied by the caller. An id maps to exactly one hosting service at
/// any time.
///
/// # Example
/// ```rust
/// use actormesh_core::ActorId;
///
/// let generated = ActorId::generate();
/// let named = ActorId::new("traffic-light-17");
/// assert_ne!(generated, named);
/// assert_eq!(named.as_str(), "traffic-light-17");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    /// Allocate a fresh UUID-backed actor id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap a caller-provided id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ActorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Stable name of a hosting service process.
///
/// # Example
/// ```rust
/// use actormesh_core::ServiceId;
///
/// let id = ServiceId::new("capteur-service");
/// assert_eq!(id.as_str(), "capteur-service");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    /// Wrap a service name.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ServiceId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ServiceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Unique identifier for message envelopes.
///
/// Every envelope carries one; receivers that need idempotent handling over
/// at-least-once transports key off it. Generated ids are UUID v4 strings,
/// but foreign senders may use any unique token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Generate a new random (UUID v4) MessageId.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an id chosen by the sender.
    pub fn from_value(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_id_generate_is_unique() {
        let id1 = ActorId::generate();
        let id2 = ActorId::generate();

        assert_ne!(id1, id2);
    }

    #[test]
    fn test_actor_id_caller_provided() {
        let id = ActorId::new("client-42");

        assert_eq!(id.as_str(), "client-42");
        assert_eq!(format!("{id}"), "client-42");
    }

    #[test]
    fn test_actor_id_serde_transparent() {
        let id = ActorId::new("a-1");
        let json = serde_json::to_string(&id).unwrap();

        assert_eq!(json, "\"a-1\"");
        let back: ActorId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_service_id_roundtrip() {
        let id = ServiceId::new("capteur-service");
        let json = serde_json::to_string(&id).unwrap();
        let back: ServiceId = serde_json::from_str(&json).unwrap();

        assert_eq!(back, id);
    }

    #[test]
    fn test_message_id_unique() {
        let id1 = MessageId::new();
        let id2 = MessageId::new();

        assert_ne!(id1, id2);
        assert!(Uuid::parse_str(id1.as_str()).is_ok());
    }

    #[test]
    fn test_message_id_foreign_token() {
        let id = MessageId::from_value("m1");

        assert_eq!(id.as_str(), "m1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"m1\"");
    }
}
