//! The internal `/runtime` HTTP facade over the local actor system.
//!
//! These endpoints are what the gateway (and peers doing direct
//! synchronous calls) speak; they require the shared secret when exposed
//! outside the cluster. `/health` and `/metrics` stay public.

// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::debug;

// Layer 3: Internal module imports
use crate::metrics::HostMetrics;
use actormesh_core::{
    require_api_key, ActorHealth, ActorId, ActorStatus, CreateCommand, CreatedActor, Envelope,
    ErrorCode, LifecycleState, Problem, SharedSecret, TellCommand, TellOutcome,
};
use actormesh_rt::{ActorSystem, SpawnRequest, SystemError};

/// Default and ceiling for the ask deadline carried in `timeoutMs`.
const DEFAULT_ASK_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_ASK_TIMEOUT: Duration = Duration::from_secs(30);

/// Facade state shared by every handler.
pub struct FacadeState {
    pub system: ActorSystem,
    pub secret: SharedSecret,
    pub metrics: Arc<HostMetrics>,
}

/// Facade failures mapped to problem responses.
#[derive(Error, Debug)]
pub enum FacadeError {
    #[error(transparent)]
    System(#[from] SystemError),
}

impl IntoResponse for FacadeError {
    fn into_response(self) -> Response {
        let FacadeError::System(error) = self;
        let (status, code) = match &error {
            SystemError::ActorNotFound(_) | SystemError::Mailbox(_) => {
                (StatusCode::NOT_FOUND, ErrorCode::NotFound)
            }
            SystemError::UnknownActorType(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::UnknownActorType)
            }
            SystemError::ActorAlreadyExists(_) | SystemError::SpawnFailed(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::Validation)
            }
            SystemError::AskTimeout(_) => (StatusCode::GATEWAY_TIMEOUT, ErrorCode::Timeout),
            SystemError::ShuttingDown => {
                (StatusCode::SERVICE_UNAVAILABLE, ErrorCode::ServiceUnavailable)
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Internal),
        };
        (status, Json(Problem::new(code, error.to_string()))).into_response()
    }
}

/// Build the facade router.
pub fn facade_router(state: Arc<FacadeState>) -> Router {
    let protected = Router::new()
        .route("/runtime/create-actor", post(create_actor))
        .route("/runtime/tell", post(tell))
        .route("/runtime/ask", post(ask))
        .route("/runtime/actors", get(list_actors))
        .route("/runtime/actors/{id}/health", get(actor_health))
        .route("/runtime/actors/{id}/restart", post(restart_actor))
        .route("/runtime/actors/{id}", delete(stop_actor))
        .route_layer(middleware::from_fn_with_state(
            state.secret.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "UP" }))
}

async fn metrics(State(state): State<Arc<FacadeState>>) -> String {
    state
        .metrics
        .live_actors
        .set(state.system.actor_count() as i64);
    state
        .metrics
        .dead_letters
        .set(state.system.dead_letters().total() as i64);
    state.metrics.render()
}

/// Registry-vocabulary view of a local lifecycle state.
fn reported_status(state: LifecycleState) -> ActorStatus {
    match state {
        LifecycleState::Running => ActorStatus::Active,
        LifecycleState::Stopped => ActorStatus::Stopped,
        _ => ActorStatus::Created,
    }
}

async fn create_actor(
    State(state): State<Arc<FacadeState>>,
    Json(command): Json<CreateCommand>,
) -> Result<Json<CreatedActor>, FacadeError> {
    let actor = state.system.spawn(SpawnRequest::from_command(command)).await?;
    state.metrics.actors_spawned.inc();

    Ok(Json(CreatedActor {
        actor_id: actor.id().clone(),
        actor_type: state
            .system
            .actor_type(actor.id())
            .unwrap_or_else(|| "unknown".to_owned()),
        service_id: state.system.service_id().clone(),
        state: reported_status(actor.state()),
    }))
}

async fn tell(
    State(state): State<Arc<FacadeState>>,
    Json(command): Json<TellCommand>,
) -> Result<Json<TellOutcome>, FacadeError> {
    let TellCommand {
        target_actor_id,
        sender_actor_id,
        message,
    } = command;
    debug!(actor_id = %target_actor_id, "facade tell");
    state
        .system
        .tell(&target_actor_id, message, sender_actor_id)
        .await?;
    state.metrics.tells_received.inc();
    Ok(Json(TellOutcome { delivered: true }))
}

#[derive(Debug, Deserialize)]
struct AskQuery {
    #[serde(rename = "timeoutMs")]
    timeout_ms: Option<u64>,
}

async fn ask(
    State(state): State<Arc<FacadeState>>,
    Query(query): Query<AskQuery>,
    Json(command): Json<TellCommand>,
) -> Result<Json<Envelope>, FacadeError> {
    let timeout = query
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_ASK_TIMEOUT)
        .min(MAX_ASK_TIMEOUT);

    let reply = state
        .system
        .ask(&command.target_actor_id, command.message, timeout)
        .await?;
    state.metrics.asks_served.inc();
    Ok(Json(reply))
}

async fn list_actors(State(state): State<Arc<FacadeState>>) -> Json<Vec<ActorId>> {
    Json(state.system.all_ids())
}

async fn actor_health(
    State(state): State<Arc<FacadeState>>,
    Path(id): Path<String>,
) -> Result<Json<ActorHealth>, FacadeError> {
    let health = state.system.health(&ActorId::new(id))?;
    Ok(Json(health))
}

async fn restart_actor(
    State(state): State<Arc<FacadeState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, FacadeError> {
    state
        .system
        .restart(&ActorId::new(id), "administrative restart")
        .await?;
    Ok(Json(json!({ "restarted": true })))
}

async fn stop_actor(
    State(state): State<Arc<FacadeState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, FacadeError> {
    state.system.stop(&ActorId::new(id)).await?;
    state.metrics.actors_stopped.inc();
    Ok(StatusCode::NO_CONTENT)
}
