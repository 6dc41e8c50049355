// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use tracing::Span;

// Layer 3: Internal module imports
use crate::push::PushError;
use crate::refs::LocalActorRef;
use crate::system::SystemRef;
use actormesh_core::{ActorId, Envelope, PlatformEventKind};

/// Execution context handed to every actor hook.
///
/// The context is an argument, never a field: actors hold no back-pointer
/// to the runtime. It exposes the actor's own ref, the sender and
/// correlation id of the envelope being processed, local lookup, event
/// publication, ask replies, and the optional outbound push channel.
pub struct ActorContext {
    self_ref: LocalActorRef,
    system: SystemRef,
    sender: Option<ActorId>,
    correlation_id: Option<String>,
}

impl ActorContext {
    pub(crate) fn new(self_ref: LocalActorRef, system: SystemRef) -> Self {
        Self {
            self_ref,
            system,
            sender: None,
            correlation_id: None,
        }
    }

    /// Set per-envelope metadata before a receive. Called by the run loop.
    pub(crate) fn prepare(&mut self, sender: Option<ActorId>, correlation_id: Option<String>) {
        self.sender = sender;
        self.correlation_id = correlation_id;
    }

    /// This actor's own ref.
    pub fn self_ref(&self) -> &LocalActorRef {
        &self.self_ref
    }

    /// This actor's id.
    pub fn actor_id(&self) -> &ActorId {
        self.self_ref.id()
    }

    /// Sender of the envelope currently being processed, when it came from
    /// another actor.
    pub fn sender(&self) -> Option<&ActorId> {
        self.sender.as_ref()
    }

    /// Correlation id of the envelope currently being processed.
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Override the correlation id carried into replies.
    pub fn set_correlation_id(&mut self, correlation_id: Option<String>) {
        self.correlation_id = correlation_id;
    }

    /// A tracing span scoped to this actor, for use inside hooks.
    pub fn span(&self) -> Span {
        tracing::info_span!("actor", actor_id = %self.actor_id())
    }

    /// Publish a lifecycle event on the system's event bus.
    pub fn publish_event(&self, kind: PlatformEventKind) {
        self.system.publish_event(kind);
    }

    /// Look up another actor hosted in this process.
    pub fn actor_for(&self, actor_id: &ActorId) -> Option<LocalActorRef> {
        self.system.actor_for(actor_id)
    }

    /// Answer a pending ask correlated with the current envelope.
    ///
    /// Returns `true` when a caller was waiting on the correlation id. The
    /// reply envelope inherits the correlation id.
    pub fn reply(&self, envelope: Envelope) -> bool {
        match &self.correlation_id {
            Some(correlation_id) => {
                let reply = envelope.with_correlation_id(correlation_id.clone());
                self.system.resolve_ask(correlation_id, reply)
            }
            None => false,
        }
    }

    /// Deliver an envelope to the external observer watching this actor,
    /// when one is registered.
    ///
    /// Returns `Ok(false)` when no observer is attached.
    pub async fn push_update(&self, envelope: &Envelope) -> Result<bool, PushError> {
        match self.system.push_sink(self.actor_id()) {
            Some(sink) => {
                sink.push(self.actor_id(), envelope).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
