//! HTTP control transport against a mocked hosting service.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use actormesh_core::{
    ActorId, CreateCommand, Envelope, RemoteAddress, RemoteTransport, SharedSecret, TellCommand,
    TransportError,
};
use actormesh_transport::HttpRemoteTransport;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport() -> HttpRemoteTransport {
    HttpRemoteTransport::new(SharedSecret::new("s3cret")).unwrap()
}

fn tell(target: &str, n: i64) -> TellCommand {
    TellCommand::new(
        ActorId::new(target),
        Envelope::new("test.Ping", json!({ "n": n })),
    )
}

#[tokio::test]
async fn send_posts_tell_with_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/runtime/tell"))
        .and(header("x-api-key", "s3cret"))
        .and(body_partial_json(json!({ "targetActorId": "a-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "delivered": true })))
        .expect(1)
        .mount(&server)
        .await;

    let target = RemoteAddress::http(server.uri(), ActorId::new("a-1"));
    transport().send(&target, tell("a-1", 1)).await.unwrap();
}

#[tokio::test]
async fn send_maps_404_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/runtime/tell"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let target = RemoteAddress::http(server.uri(), ActorId::new("ghost"));
    let err = transport().send(&target, tell("ghost", 1)).await.unwrap_err();
    assert!(matches!(err, TransportError::NotFound(_)));
}

#[tokio::test]
async fn send_maps_503_to_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/runtime/tell"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let target = RemoteAddress::http(server.uri(), ActorId::new("a-1"));
    let err = transport().send(&target, tell("a-1", 1)).await.unwrap_err();
    assert!(matches!(err, TransportError::Unavailable(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn connection_refused_is_retryable() {
    // Nothing listens on this port.
    let target = RemoteAddress::http("http://127.0.0.1:1", ActorId::new("a-1"));
    let err = transport().send(&target, tell("a-1", 1)).await.unwrap_err();

    assert!(matches!(err, TransportError::Connection(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn exists_reflects_health_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/runtime/actors/a-1/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "state": "RUNNING",
            "queueSize": 0
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/runtime/actors/ghost/health"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let transport = transport();
    let live = RemoteAddress::http(server.uri(), ActorId::new("a-1"));
    let dead = RemoteAddress::http(server.uri(), ActorId::new("ghost"));

    assert!(transport.exists(&live).await.unwrap());
    assert!(!transport.exists(&dead).await.unwrap());
}

#[tokio::test]
async fn state_parses_health_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/runtime/actors/a-1/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "state": "RUNNING",
            "queueSize": 7,
            "lastMessageAt": "2025-06-01T12:00:00Z"
        })))
        .mount(&server)
        .await;

    let target = RemoteAddress::http(server.uri(), ActorId::new("a-1"));
    let health = transport().state(&target).await.unwrap();

    assert_eq!(health.queue_size, 7);
    assert!(health.last_message_at.is_some());
}

#[tokio::test]
async fn stop_issues_delete() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/runtime/actors/a-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let target = RemoteAddress::http(server.uri(), ActorId::new("a-1"));
    transport().stop(&target).await.unwrap();
}

#[tokio::test]
async fn ask_round_trips_reply_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/runtime/ask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "test.Pong",
            "messageId": "m-reply",
            "timestamp": "2025-06-01T12:00:00Z",
            "correlationId": "corr-1",
            "payload": { "n": 42 }
        })))
        .mount(&server)
        .await;

    let target = RemoteAddress::http(server.uri(), ActorId::new("a-1"));
    let reply = transport()
        .ask(&target, tell("a-1", 42), Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(reply.message_type, "test.Pong");
    assert_eq!(reply.payload["n"], 42);
}

#[tokio::test]
async fn ask_maps_gateway_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/runtime/ask"))
        .respond_with(ResponseTemplate::new(504))
        .mount(&server)
        .await;

    let target = RemoteAddress::http(server.uri(), ActorId::new("a-1"));
    let err = transport()
        .ask(&target, tell("a-1", 1), Duration::from_millis(100))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Timeout(_)));
}

#[tokio::test]
async fn create_actor_parses_created_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/runtime/create-actor"))
        .and(body_partial_json(json!({ "actorType": "CapteurActor" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "actorId": "a-9",
            "actorType": "CapteurActor",
            "serviceId": "capteur-service",
            "state": "CREATED"
        })))
        .mount(&server)
        .await;

    let command = CreateCommand {
        actor_type: "CapteurActor".to_owned(),
        actor_id: None,
        params: actormesh_core::Params::new(),
        requester_id: None,
    };
    let created = transport()
        .create_actor(&server.uri(), &command)
        .await
        .unwrap();

    assert_eq!(created.actor_id.as_str(), "a-9");
    assert_eq!(created.service_id.as_str(), "capteur-service");
}
