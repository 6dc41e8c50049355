// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

// Layer 3: Internal module imports
use super::error::GatewayError;
use super::AppState;
use actormesh_core::{
    ActorId, ActorRecord, ActorStatus, CreateActorRequest, CreateCommand, PlatformEventKind,
    RemoteAddress, RemoteTransport, ServiceId, TellCommand, TellOutcome,
};

/// Success body for `POST /api/v1/actors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActorResponse {
    pub actor_id: ActorId,
    pub actor_type: String,
    pub service_id: ServiceId,
    pub service_url: String,
    pub state: ActorStatus,
}

/// `POST /api/v1/actors`: validate the target service, forward the create,
/// record the outcome.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateActorRequest>,
) -> Result<Json<CreateActorResponse>, Response> {
    let retry = state.retry_after_secs;
    create_inner(state, request)
        .await
        .map_err(|error| error.into_response_with_retry(retry))
}

async fn create_inner(
    state: Arc<AppState>,
    request: CreateActorRequest,
) -> Result<Json<CreateActorResponse>, GatewayError> {
    if request.actor_type.trim().is_empty() {
        return Err(GatewayError::Validation("actorType must not be empty".into()));
    }

    let service = state
        .services
        .get(&request.service_id)
        .await?
        .ok_or_else(|| GatewayError::NotFound(format!("unknown service: {}", request.service_id)))?;
    if !service.healthy {
        return Err(GatewayError::ServiceUnavailable(format!(
            "service {} is currently down",
            service.service_id
        )));
    }

    let actor_id = request.actor_id.clone().unwrap_or_else(ActorId::generate);
    if state.actors.get(&actor_id).await?.is_some() {
        return Err(GatewayError::Validation(format!(
            "actor id already registered: {actor_id}"
        )));
    }

    let command = CreateCommand {
        actor_type: request.actor_type.clone(),
        actor_id: Some(actor_id.clone()),
        params: request.params.clone(),
        requester_id: None,
    };
    let created = state
        .transport
        .create_actor(&service.service_url, &command)
        .await
        .map_err(|error| GatewayError::from_transport(error, service.service_id.as_str()))?;

    let record = ActorRecord {
        actor_id: created.actor_id.clone(),
        actor_type: created.actor_type.clone(),
        service_id: service.service_id.clone(),
        service_url: service.service_url.clone(),
        status: created.state,
        created_at: Utc::now(),
        properties: request.params,
    };
    state.actors.put(record).await?;
    state.metrics.actors_created.inc();
    state.events.publish(PlatformEventKind::ActorCreated {
        actor_id: created.actor_id.clone(),
        actor_type: created.actor_type.clone(),
    });
    info!(actor_id = %created.actor_id, service_id = %service.service_id, "actor created");

    Ok(Json(CreateActorResponse {
        actor_id: created.actor_id,
        actor_type: created.actor_type,
        service_id: service.service_id,
        service_url: service.service_url,
        state: created.state,
    }))
}

/// `GET /api/v1/actors`
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ActorRecord>>, GatewayError> {
    Ok(Json(state.actors.list().await?))
}

/// `GET /api/v1/actors/{id}`
pub async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ActorRecord>, GatewayError> {
    let actor_id = ActorId::new(id);
    let record = state
        .actors
        .get(&actor_id)
        .await?
        .ok_or_else(|| GatewayError::NotFound(format!("unknown actor: {actor_id}")))?;
    Ok(Json(record))
}

/// `GET /api/v1/actors/by-service/{service_id}`
pub async fn by_service(
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<String>,
) -> Result<Json<Vec<ActorRecord>>, GatewayError> {
    let service_id = ServiceId::new(service_id);
    if state.services.get(&service_id).await?.is_none() {
        return Err(GatewayError::NotFound(format!(
            "unknown service: {service_id}"
        )));
    }
    Ok(Json(state.actors.list_by_service(&service_id).await?))
}

/// `DELETE /api/v1/actors/{id}`: stop on the hosting service, then drop the
/// record.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, GatewayError> {
    let actor_id = ActorId::new(id);
    let record = state
        .actors
        .get(&actor_id)
        .await?
        .ok_or_else(|| GatewayError::NotFound(format!("unknown actor: {actor_id}")))?;

    let address = RemoteAddress::http(record.service_url.clone(), actor_id.clone());
    match state.transport.stop(&address).await {
        // Already gone on the hosting side still removes the record.
        Ok(()) | Err(actormesh_core::TransportError::NotFound(_)) => {}
        Err(error) => {
            return Err(GatewayError::from_transport(
                error,
                record.service_id.as_str(),
            ))
        }
    }

    state.actors.remove(&actor_id).await?;
    state.metrics.actors_deleted.inc();
    info!(%actor_id, "actor deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/v1/actors/{id}/tell`: resolve, refuse unavailable targets,
/// forward. The outcome is never masked.
pub async fn tell(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(mut command): Json<TellCommand>,
) -> Result<Json<TellOutcome>, Response> {
    let retry = state.retry_after_secs;
    let actor_id = ActorId::new(id);
    // The path is authoritative for routing.
    command.target_actor_id = actor_id.clone();

    tell_inner(state, actor_id, command)
        .await
        .map_err(|error| error.into_response_with_retry(retry))
}

async fn tell_inner(
    state: Arc<AppState>,
    actor_id: ActorId,
    command: TellCommand,
) -> Result<Json<TellOutcome>, GatewayError> {
    let record = state.actors.get(&actor_id).await?.ok_or_else(|| {
        state.metrics.tells_rejected.inc();
        GatewayError::NotFound(format!("unknown actor: {actor_id}"))
    })?;

    match record.status {
        ActorStatus::Unavailable => {
            state.metrics.tells_rejected.inc();
            return Err(GatewayError::ActorUnavailable(format!(
                "actor {actor_id} is on a down service ({})",
                record.service_id
            )));
        }
        ActorStatus::Stopped => {
            state.metrics.tells_rejected.inc();
            return Err(GatewayError::NotFound(format!(
                "actor {actor_id} is stopped"
            )));
        }
        ActorStatus::Created | ActorStatus::Active => {}
    }

    let address = RemoteAddress::http(record.service_url.clone(), actor_id);
    state
        .transport
        .send(&address, command)
        .await
        .map_err(|error| {
            state.metrics.tells_rejected.inc();
            GatewayError::from_transport(error, record.service_id.as_str())
        })?;

    state.metrics.tells_forwarded.inc();
    Ok(Json(TellOutcome { delivered: true }))
}
