//! `/runtime` facade tests against a live local actor system.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use actormesh_core::SharedSecret;
use actormesh_host::{default_factory, facade_router, FacadeState, HostMetrics};
use actormesh_rt::{ActorSystem, RuntimeConfig};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(secret: &str) -> (Router, ActorSystem) {
    let system = ActorSystem::new(RuntimeConfig::default(), "test-service", default_factory());
    let state = Arc::new(FacadeState {
        system: system.clone(),
        secret: SharedSecret::new(secret),
        metrics: Arc::new(HostMetrics::new().unwrap()),
    });
    (facade_router(state), system)
}

fn request(method: &str, uri: &str, api_key: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn tell_body(actor_id: &str, n: i64) -> Value {
    json!({
        "targetActorId": actor_id,
        "message": {
            "type": "test.Ping",
            "messageId": format!("m-{n}"),
            "timestamp": "2025-01-01T00:00:00Z",
            "correlationId": null,
            "payload": { "n": n }
        }
    })
}

#[tokio::test]
async fn create_actor_returns_identity_and_state() {
    let (app, system) = app("");

    let response = app
        .oneshot(request(
            "POST",
            "/runtime/create-actor",
            None,
            Some(json!({ "actorType": "EchoActor", "actorId": "echo-1" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["actorId"], "echo-1");
    assert_eq!(body["actorType"], "EchoActor");
    assert_eq!(body["serviceId"], "test-service");
    assert!(matches!(
        body["state"].as_str().unwrap(),
        "CREATED" | "ACTIVE"
    ));
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn create_unknown_type_is_400() {
    let (app, system) = app("");

    let response = app
        .oneshot(request(
            "POST",
            "/runtime/create-actor",
            None,
            Some(json!({ "actorType": "Ghost" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "unknown_actor_type");
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn tell_enqueues_and_missing_target_is_404() {
    let (app, system) = app("");
    app.clone()
        .oneshot(request(
            "POST",
            "/runtime/create-actor",
            None,
            Some(json!({ "actorType": "EchoActor", "actorId": "echo-1" })),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/runtime/tell",
            None,
            Some(tell_body("echo-1", 1)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["delivered"], true);

    let response = app
        .oneshot(request(
            "POST",
            "/runtime/tell",
            None,
            Some(tell_body("ghost", 1)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn ask_round_trips_through_echo() {
    let (app, system) = app("");
    app.clone()
        .oneshot(request(
            "POST",
            "/runtime/create-actor",
            None,
            Some(json!({ "actorType": "EchoActor", "actorId": "echo-1" })),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(request(
            "POST",
            "/runtime/ask?timeoutMs=1000",
            None,
            Some(tell_body("echo-1", 42)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let reply = json_body(response).await;
    assert_eq!(reply["type"], "echo.Pong");
    assert_eq!(reply["payload"]["echoed"]["n"], 42);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn health_restart_and_stop_lifecycle() {
    let (app, system) = app("");
    app.clone()
        .oneshot(request(
            "POST",
            "/runtime/create-actor",
            None,
            Some(json!({ "actorType": "EchoActor", "actorId": "echo-1" })),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request("GET", "/runtime/actors/echo-1/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let health = json_body(response).await;
    assert!(matches!(
        health["state"].as_str().unwrap(),
        "CREATED" | "STARTING" | "RUNNING"
    ));

    let response = app
        .clone()
        .oneshot(request("POST", "/runtime/actors/echo-1/restart", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request("GET", "/runtime/actors", None, None))
        .await
        .unwrap();
    let ids = json_body(response).await;
    assert_eq!(ids.as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(request("DELETE", "/runtime/actors/echo-1", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(request("GET", "/runtime/actors/echo-1/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn facade_requires_api_key_when_configured() {
    let (app, system) = app("s3cret");

    let response = app
        .clone()
        .oneshot(request("GET", "/runtime/actors", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(request("GET", "/runtime/actors", Some("s3cret"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Liveness stays public for the health monitor.
    let response = app
        .oneshot(request("GET", "/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn metrics_reflect_runtime_counters() {
    let (app, system) = app("");
    app.clone()
        .oneshot(request(
            "POST",
            "/runtime/create-actor",
            None,
            Some(json!({ "actorType": "EchoActor", "actorId": "echo-1" })),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(request("GET", "/metrics", None, None))
        .await
        .unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains("actormesh_host_actors_spawned_total 1"));
    assert!(text.contains("actormesh_host_live_actors 1"));
    system.shutdown().await.unwrap();
}
