//! The public `/api/v1` surface.

pub mod actors;
pub mod error;
pub mod services;

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use axum::extract::State;
use axum::middleware;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

// Layer 3: Internal module imports
use crate::metrics::GatewayMetrics;
use crate::registry::{ActorRegistryHandle, ServiceRegistryHandle};
use actormesh_core::{require_api_key, EventBus, SharedSecret};
use actormesh_transport::HttpRemoteTransport;

pub use error::GatewayError;

/// Everything the handlers need.
pub struct AppState {
    pub actors: ActorRegistryHandle,
    pub services: ServiceRegistryHandle,
    pub transport: HttpRemoteTransport,
    pub events: EventBus,
    pub secret: SharedSecret,
    pub metrics: Arc<GatewayMetrics>,

    /// Retry hint attached to 503 responses, in seconds (the probe
    /// interval: the next sweep may recover the service).
    pub retry_after_secs: u64,
}

/// Build the gateway router.
///
/// `/health` and `/metrics` are public; everything under `/api/v1` sits
/// behind the shared-secret filter (disabled when the secret is empty).
pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/api/v1/actors", post(actors::create).get(actors::list))
        .route(
            "/api/v1/actors/{id}",
            get(actors::get_one).delete(actors::delete),
        )
        .route("/api/v1/actors/{id}/tell", post(actors::tell))
        .route(
            "/api/v1/actors/by-service/{service_id}",
            get(actors::by_service),
        )
        .route("/api/v1/services", get(services::list))
        .route("/api/v1/services/register", post(services::register))
        .route("/api/v1/services/heartbeat", post(services::heartbeat))
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

async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics.render()
}
