// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use thiserror::Error;

// Layer 3: Internal module imports
use crate::command::TellCommand;
use crate::envelope::Envelope;
use crate::ids::ActorId;
use crate::record::ActorHealth;

/// Logical address of a remote actor.
///
/// The HTTP control transport needs the hosting service URL; the
/// streaming-bus transport addresses by actor id alone and resolves the
/// topic itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAddress {
    /// Hosting service base URL, when known
    pub service_url: Option<String>,

    /// Target actor
    pub actor_id: ActorId,
}

impl RemoteAddress {
    /// Address reachable over HTTP at a known hosting service.
    pub fn http(service_url: impl Into<String>, actor_id: ActorId) -> Self {
        Self {
            service_url: Some(service_url.into()),
            actor_id,
        }
    }

    /// Address reachable by actor id only (bus delivery).
    pub fn bus(actor_id: ActorId) -> Self {
        Self {
            service_url: None,
            actor_id,
        }
    }
}

/// Failures of remote delivery and remote control operations.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The remote side does not know the target actor
    #[error("target actor not found: {0}")]
    NotFound(ActorId),

    /// The remote side exists but refuses the operation right now
    #[error("target unavailable: {0}")]
    Unavailable(String),

    /// Deadline exceeded
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection-level failure (refused, reset, DNS)
    #[error("connection failure: {0}")]
    Connection(String),

    /// Wire encode/decode failure
    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),

    /// This transport does not implement the operation
    #[error("operation not supported by this transport: {0}")]
    Unsupported(&'static str),

    /// HTTP delivery needs a service URL the address did not carry
    #[error("no service url for http delivery to {0}")]
    MissingServiceUrl(ActorId),

    /// Remote side answered with an unexpected status or body
    #[error("unexpected remote response: {0}")]
    Protocol(String),

    /// Remote side rejected the request as invalid (client error)
    #[error("remote rejected request: {0}")]
    Rejected(String),
}

impl TransportError {
    /// Whether the caller may reasonably retry later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::Unavailable(_)
                | TransportError::Timeout(_)
                | TransportError::Connection(_)
        )
    }
}

/// Contract every remote message transport implements.
///
/// Constructed at startup and injected into whoever routes remotely (the
/// gateway's forwarder, remote actor refs, the host's outbound data plane);
/// there are no process-wide transport singletons.
///
/// `ask` defaults to unsupported: only transports with a synchronous
/// request path (HTTP) implement it. Fire-and-forget transports also return
/// [`TransportError::Unsupported`] from the control operations they cannot
/// answer (`exists`, `stop`, `state`).
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// Deliver a tell to the target (fire-and-forget).
    async fn send(&self, target: &RemoteAddress, command: TellCommand)
        -> Result<(), TransportError>;

    /// Request-reply with an explicit deadline.
    async fn ask(
        &self,
        _target: &RemoteAddress,
        _command: TellCommand,
        _timeout: Duration,
    ) -> Result<Envelope, TransportError> {
        Err(TransportError::Unsupported("ask"))
    }

    /// Whether the target actor exists on the remote side.
    async fn exists(&self, target: &RemoteAddress) -> Result<bool, TransportError>;

    /// Stop the target actor remotely.
    async fn stop(&self, target: &RemoteAddress) -> Result<(), TransportError>;

    /// Fetch the target actor's health snapshot.
    async fn state(&self, target: &RemoteAddress) -> Result<ActorHealth, TransportError>;
}
