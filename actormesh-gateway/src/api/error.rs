// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

// Layer 3: Internal module imports
use crate::registry::RegistryError;
use actormesh_core::{ErrorCode, Problem, TransportError};

/// Gateway-level failures, each mapped to one status + problem body.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Malformed request or conflicting parameters
    #[error("{0}")]
    Validation(String),

    /// The hosting service's factory refused the type
    #[error("unknown actor type: {0}")]
    UnknownActorType(String),

    /// Actor or service id missing from the registry
    #[error("{0}")]
    NotFound(String),

    /// Target service registered but currently flagged down
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Actor exists but its hosting service is flagged down
    #[error("actor unavailable: {0}")]
    ActorUnavailable(String),

    /// Downstream call exceeded its deadline
    #[error("downstream timeout: {0}")]
    Timeout(String),

    /// Downstream connection or protocol failure
    #[error("downstream failure: {0}")]
    Transport(String),

    /// Registry task gone (process shutdown)
    #[error("registry unavailable")]
    Registry(#[from] RegistryError),
}

impl GatewayError {
    /// Map a forwarding failure onto the gateway's error space.
    pub fn from_transport(error: TransportError, target: &str) -> Self {
        match error {
            TransportError::NotFound(actor_id) => {
                GatewayError::NotFound(format!("actor not found on hosting service: {actor_id}"))
            }
            TransportError::Rejected(message) => GatewayError::UnknownActorType(message),
            TransportError::Timeout(timeout) => {
                GatewayError::Timeout(format!("{target} did not answer within {timeout:?}"))
            }
            TransportError::Unavailable(message) => GatewayError::ServiceUnavailable(message),
            other => GatewayError::Transport(other.to_string()),
        }
    }

    fn status_and_problem(&self, retry_after_secs: Option<u64>) -> (StatusCode, Problem) {
        match self {
            GatewayError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                Problem::new(ErrorCode::Validation, message.clone()),
            ),
            GatewayError::UnknownActorType(message) => (
                StatusCode::BAD_REQUEST,
                Problem::new(ErrorCode::UnknownActorType, message.clone()),
            ),
            GatewayError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Problem::new(ErrorCode::NotFound, message.clone()),
            ),
            GatewayError::ServiceUnavailable(message) => {
                let mut problem = Problem::new(ErrorCode::ServiceUnavailable, message.clone());
                if let Some(secs) = retry_after_secs {
                    problem = problem.with_retry_after(secs);
                }
                (StatusCode::SERVICE_UNAVAILABLE, problem)
            }
            GatewayError::ActorUnavailable(message) => {
                let mut problem = Problem::new(ErrorCode::ActorUnavailable, message.clone());
                if let Some(secs) = retry_after_secs {
                    problem = problem.with_retry_after(secs);
                }
                (StatusCode::SERVICE_UNAVAILABLE, problem)
            }
            GatewayError::Timeout(message) => (
                StatusCode::GATEWAY_TIMEOUT,
                Problem::new(ErrorCode::Timeout, message.clone()),
            ),
            GatewayError::Transport(message) => (
                StatusCode::BAD_GATEWAY,
                Problem::new(ErrorCode::Transport, message.clone()),
            ),
            GatewayError::Registry(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Problem::new(ErrorCode::Internal, "registry unavailable"),
            ),
        }
    }

    /// Render with a retry hint on the 503 family.
    pub fn into_response_with_retry(self, retry_after_secs: u64) -> Response {
        let (status, problem) = self.status_and_problem(Some(retry_after_secs));
        (status, Json(problem)).into_response()
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, problem) = self.status_and_problem(None);
        (status, Json(problem)).into_response()
    }
}
