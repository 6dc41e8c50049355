//! End-to-end bus transport tests: producer transport -> in-memory bus ->
//! consumer -> local delivery, under both topic strategies.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use actormesh_core::{
    ActorId, Envelope, EventBus, PlatformEventKind, RemoteAddress, RemoteTransport, TellCommand,
};
use actormesh_transport::{
    BusConsumer, BusRemoteTransport, DeliveryError, InMemoryBus, LocalDelivery, TopicResolver,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

/// Test double standing in for a hosting service's actor system.
struct FakeRuntime {
    hosted: Vec<ActorId>,
    delivered: Mutex<Vec<TellCommand>>,
}

impl FakeRuntime {
    fn hosting(ids: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            hosted: ids.iter().map(|id| ActorId::new(*id)).collect(),
            delivered: Mutex::new(Vec::new()),
        })
    }

    fn delivered_payloads(&self) -> Vec<i64> {
        self.delivered
            .lock()
            .iter()
            .filter_map(|cmd| cmd.message.payload.get("n").and_then(|v| v.as_i64()))
            .collect()
    }
}

#[async_trait]
impl LocalDelivery for FakeRuntime {
    async fn deliver(&self, command: TellCommand) -> Result<(), DeliveryError> {
        self.delivered.lock().push(command);
        Ok(())
    }

    fn is_local(&self, actor_id: &ActorId) -> bool {
        self.hosted.contains(actor_id)
    }

    fn local_ids(&self) -> Vec<ActorId> {
        self.hosted.clone()
    }
}

fn tell(target: &str, n: i64) -> TellCommand {
    TellCommand::new(
        ActorId::new(target),
        Envelope::new("test.Ping", json!({ "n": n })),
    )
}

async fn wait_until(deadline: Duration, mut predicate: impl FnMut() -> bool) -> bool {
    let start = tokio::time::Instant::now();
    while start.elapsed() < deadline {
        if predicate() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    predicate()
}

#[tokio::test]
async fn per_actor_strategy_delivers_in_order() {
    let bus = InMemoryBus::new();
    let runtime = FakeRuntime::hosting(&["a-1"]);
    let events = EventBus::new();

    let consumer = BusConsumer::new(
        Arc::new(bus.clone()),
        TopicResolver::per_actor(),
        Arc::clone(&runtime) as Arc<dyn LocalDelivery>,
        events,
    );
    consumer.start().await.unwrap();
    assert_eq!(consumer.subscription_count(), 1);

    let transport = BusRemoteTransport::new(Arc::new(bus), TopicResolver::per_actor());
    let target = RemoteAddress::bus(ActorId::new("a-1"));
    for n in 0..5 {
        transport.send(&target, tell("a-1", n)).await.unwrap();
    }

    assert!(
        wait_until(Duration::from_secs(1), || runtime
            .delivered_payloads()
            .len()
            == 5)
        .await
    );
    assert_eq!(runtime.delivered_payloads(), vec![0, 1, 2, 3, 4]);
    consumer.stop();
}

#[tokio::test]
async fn per_actor_strategy_follows_actor_creation_events() {
    let bus = InMemoryBus::new();
    let runtime = FakeRuntime::hosting(&[]);
    let events = EventBus::new();

    let consumer = BusConsumer::new(
        Arc::new(bus.clone()),
        TopicResolver::per_actor(),
        Arc::clone(&runtime) as Arc<dyn LocalDelivery>,
        events.clone(),
    );
    consumer.start().await.unwrap();
    assert_eq!(consumer.subscription_count(), 0);

    events.publish(PlatformEventKind::ActorCreated {
        actor_id: ActorId::new("late-1"),
        actor_type: "Echo".to_owned(),
    });
    assert!(wait_until(Duration::from_secs(1), || consumer.subscription_count() == 1).await);

    let transport = BusRemoteTransport::new(Arc::new(bus), TopicResolver::per_actor());
    transport
        .send(&RemoteAddress::bus(ActorId::new("late-1")), tell("late-1", 9))
        .await
        .unwrap();

    assert!(
        wait_until(Duration::from_secs(1), || !runtime
            .delivered_payloads()
            .is_empty())
        .await
    );

    events.publish(PlatformEventKind::ActorStopped {
        actor_id: ActorId::new("late-1"),
    });
    assert!(wait_until(Duration::from_secs(1), || consumer.subscription_count() == 0).await);
    consumer.stop();
}

#[tokio::test]
async fn shared_strategy_filters_foreign_targets() {
    let bus = InMemoryBus::new();
    let resolver = TopicResolver::shared("actor-messages");
    let runtime = FakeRuntime::hosting(&["mine"]);
    let events = EventBus::new();

    let consumer = BusConsumer::new(
        Arc::new(bus.clone()),
        resolver.clone(),
        Arc::clone(&runtime) as Arc<dyn LocalDelivery>,
        events,
    );
    consumer.start().await.unwrap();

    let transport = BusRemoteTransport::new(Arc::new(bus), resolver);
    transport
        .send(&RemoteAddress::bus(ActorId::new("mine")), tell("mine", 1))
        .await
        .unwrap();
    transport
        .send(&RemoteAddress::bus(ActorId::new("theirs")), tell("theirs", 2))
        .await
        .unwrap();
    transport
        .send(&RemoteAddress::bus(ActorId::new("mine")), tell("mine", 3))
        .await
        .unwrap();

    assert!(
        wait_until(Duration::from_secs(1), || runtime
            .delivered_payloads()
            .len()
            == 2)
        .await
    );
    assert_eq!(runtime.delivered_payloads(), vec![1, 3]);
    consumer.stop();
}

#[tokio::test]
async fn undecodable_records_are_skipped() {
    let bus = InMemoryBus::new();
    let runtime = FakeRuntime::hosting(&["a-1"]);
    let events = EventBus::new();

    let consumer = BusConsumer::new(
        Arc::new(bus.clone()),
        TopicResolver::per_actor(),
        Arc::clone(&runtime) as Arc<dyn LocalDelivery>,
        events,
    );
    consumer.start().await.unwrap();

    use actormesh_transport::{BusRecord, MessageBus};
    bus.publish(BusRecord::new("actor-a-1", None, b"not json".to_vec()))
        .await
        .unwrap();

    let transport = BusRemoteTransport::new(Arc::new(bus), TopicResolver::per_actor());
    transport
        .send(&RemoteAddress::bus(ActorId::new("a-1")), tell("a-1", 4))
        .await
        .unwrap();

    assert!(
        wait_until(Duration::from_secs(1), || runtime
            .delivered_payloads()
            == vec![4])
        .await
    );
    consumer.stop();
}
