//! The user-facing actor contract.
//!
//! Actors are addressed by opaque type strings and exchange dynamic
//! [`Envelope`]s, so the trait is object safe: a hosting service's factory
//! hands the system `Box<dyn Actor>` instances built from creation
//! parameters.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use super::context::ActorContext;
use super::error::ActorError;
use actormesh_core::Envelope;

/// An actor: private state plus sequential message handling.
///
/// # Lifecycle Hooks
///
/// - `receive`: process one envelope (REQUIRED)
/// - `pre_start`: runs exactly once before the first receive
/// - `post_stop`: runs exactly once after the last receive
/// - `pre_restart` / `post_restart`: bracket instance replacement on a
///   RESTART directive; they default to `post_stop` / `pre_start`
///
/// The context is always passed as an argument; actors hold no back-pointer
/// to the runtime.
///
/// # Errors
///
/// An error returned from `receive` never reaches the sender of a tell. It
/// drives supervision: the strategy configured at spawn maps the error's
/// kind to a directive (resume, restart, stop, escalate).
///
/// # Example
///
/// ```rust,ignore
/// use actormesh_rt::{Actor, ActorContext, ActorError};
/// use actormesh_core::Envelope;
/// use async_trait::async_trait;
///
/// struct Relay;
///
/// #[async_trait]
/// impl Actor for Relay {
///     async fn receive(
///         &mut self,
///         envelope: Envelope,
///         context: &mut ActorContext,
///     ) -> Result<(), ActorError> {
///         if envelope.message_type == "relay.Forward" {
///             let target = context
///                 .actor_for(&"downstream".into())
///                 .ok_or_else(|| ActorError::new("routing", "downstream missing"))?;
///             target.tell(envelope, Some(context.actor_id().clone())).await.ok();
///         }
///         Ok(())
///     }
/// }
/// ```
impl std::fmt::Debug for dyn Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Actor")
    }
}

#[async_trait]
pub trait Actor: Send + 'static {
    /// Process one envelope.
    async fn receive(
        &mut self,
        envelope: Envelope,
        context: &mut ActorContext,
    ) -> Result<(), ActorError>;

    /// Called exactly once before the first receive.
    ///
    /// A failure here is handled by supervision exactly like a receive
    /// failure.
    async fn pre_start(&mut self, _context: &mut ActorContext) -> Result<(), ActorError> {
        Ok(())
    }

    /// Called exactly once after the last receive, or after supervision
    /// decided STOP. Errors are logged and otherwise ignored; the actor
    /// stops regardless.
    async fn post_stop(&mut self, _context: &mut ActorContext) -> Result<(), ActorError> {
        Ok(())
    }

    /// Called on the failing instance before it is discarded on RESTART.
    ///
    /// `failing` is the envelope whose processing failed, when the failure
    /// came out of `receive`. Defaults to `post_stop`.
    async fn pre_restart(
        &mut self,
        _cause: &ActorError,
        _failing: Option<&Envelope>,
        context: &mut ActorContext,
    ) -> Result<(), ActorError> {
        self.post_stop(context).await
    }

    /// Called on the replacement instance after construction on RESTART.
    ///
    /// Defaults to `pre_start`.
    async fn post_restart(
        &mut self,
        _cause: &ActorError,
        context: &mut ActorContext,
    ) -> Result<(), ActorError> {
        self.pre_start(context).await
    }
}
