// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use axum::extract::State;
use axum::Json;
use tracing::info;

// Layer 3: Internal module imports
use super::error::GatewayError;
use super::AppState;
use actormesh_core::{
    HeartbeatRequest, PlatformEventKind, RegisterServiceRequest, ServiceRecord,
};

/// `GET /api/v1/services`
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ServiceRecord>>, GatewayError> {
    Ok(Json(state.services.list().await?))
}

/// `POST /api/v1/services/register`
///
/// Idempotent per service id. A re-registration while the service is
/// flagged unhealthy recovers it immediately: its actors flip back to
/// ACTIVE without waiting for the next probe.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterServiceRequest>,
) -> Result<Json<ServiceRecord>, GatewayError> {
    if request.service_url.trim().is_empty() {
        return Err(GatewayError::Validation(
            "serviceUrl must not be empty".into(),
        ));
    }
    if request.service_id.as_str().trim().is_empty() {
        return Err(GatewayError::Validation(
            "serviceId must not be empty".into(),
        ));
    }

    let registered = state.services.register(request).await?;
    state.metrics.services_registered.inc();
    state.events.publish(PlatformEventKind::ServiceRegistered {
        service_id: registered.record.service_id.clone(),
    });

    if registered.recovered {
        let recovered_actors = state
            .actors
            .mark_service_availability(&registered.record.service_id, true)
            .await?;
        info!(
            service_id = %registered.record.service_id,
            recovered_actors = recovered_actors.len(),
            "service recovered through re-registration"
        );
        state.events.publish(PlatformEventKind::ServiceRecovered {
            service_id: registered.record.service_id.clone(),
        });
    }

    Ok(Json(registered.record))
}

/// `POST /api/v1/services/heartbeat`
pub async fn heartbeat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<HeartbeatRequest>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    if !state.services.heartbeat(&request.service_id).await? {
        return Err(GatewayError::NotFound(format!(
            "unknown service: {}",
            request.service_id
        )));
    }
    Ok(Json(serde_json::json!({ "acknowledged": true })))
}
