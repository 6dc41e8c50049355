//! System-level error types.

// Layer 1: Standard library
use std::time::Duration;

// Layer 2: Third-party
use thiserror::Error;

// Layer 3: Internal
use crate::mailbox::MailboxError;
use actormesh_core::ActorId;

/// Errors from process-local actor system operations.
#[derive(Error, Debug)]
pub enum SystemError {
    /// Actor with the given id not hosted in this process
    #[error("actor not found: {0}")]
    ActorNotFound(ActorId),

    /// Caller-provided id collides with a live actor
    #[error("actor already exists: {0}")]
    ActorAlreadyExists(ActorId),

    /// The factory does not support the requested type
    #[error("unknown actor type: {0}")]
    UnknownActorType(String),

    /// The factory rejected the creation parameters
    #[error("failed to spawn actor: {0}")]
    SpawnFailed(String),

    /// Enqueue against a stopped actor
    #[error(transparent)]
    Mailbox(#[from] MailboxError),

    /// System is shutting down, no new operations accepted
    #[error("system shutdown in progress")]
    ShuttingDown,

    /// Ask deadline exceeded
    #[error("ask timed out after {0:?}")]
    AskTimeout(Duration),

    /// The asked actor stopped before replying
    #[error("ask abandoned: {0}")]
    AskAbandoned(String),

    /// Administrative restart was refused by the task
    #[error("restart failed for {0}")]
    RestartFailed(ActorId),

    /// Graceful shutdown did not finish in time
    #[error("shutdown timeout exceeded after {0:?}")]
    ShutdownTimeout(Duration),

    /// Actor limit exceeded
    #[error("actor limit exceeded: current {current}, max {max}")]
    ActorLimitExceeded { current: usize, max: usize },
}

impl SystemError {
    /// Whether a retry may succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SystemError::AskTimeout(_) | SystemError::ActorLimitExceeded { .. }
        )
    }

    /// Whether the system can keep operating after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            SystemError::ShuttingDown | SystemError::ShutdownTimeout(_)
        )
    }
}
