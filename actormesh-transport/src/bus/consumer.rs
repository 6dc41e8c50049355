// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

// Layer 3: Internal module imports
use super::topic::TopicResolver;
use super::traits::{BusError, MessageBus};
use actormesh_core::{ActorId, EventBus, PlatformEventKind, TellCommand, TopicStrategy};

/// Failure enqueuing a decoded tell into the local runtime.
#[derive(Error, Debug)]
#[error("local delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// The seam between the bus consumer and the hosting service's actor
/// system: the host implements this over its ActorSystem so the transport
/// crate stays runtime-agnostic.
#[async_trait]
pub trait LocalDelivery: Send + Sync {
    /// Enqueue a decoded tell into the target's local mailbox.
    async fn deliver(&self, command: TellCommand) -> Result<(), DeliveryError>;

    /// Whether the actor is hosted in this process.
    fn is_local(&self, actor_id: &ActorId) -> bool;

    /// Ids of every locally hosted actor, for subscription bootstrap.
    fn local_ids(&self) -> Vec<ActorId>;
}

/// Consumer side of the bus transport inside one hosting service.
///
/// - per-actor strategy: one subscription per locally hosted actor,
///   created on ActorCreated events and dropped on ActorStopped.
/// - shared strategy: a single subscription; records whose target is not
///   local are ignored (another service owns them).
///
/// Decoded tell commands are re-enqueued through [`LocalDelivery`].
/// Delivery is at-least-once relative to the bus; receivers needing
/// idempotence dedupe on the envelope's `messageId`.
pub struct BusConsumer {
    bus: Arc<dyn MessageBus>,
    resolver: TopicResolver,
    delivery: Arc<dyn LocalDelivery>,
    events: EventBus,
    subscriptions: Arc<DashMap<ActorId, JoinHandle<()>>>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl BusConsumer {
    /// Build a consumer; call [`BusConsumer::start`] to begin consuming.
    pub fn new(
        bus: Arc<dyn MessageBus>,
        resolver: TopicResolver,
        delivery: Arc<dyn LocalDelivery>,
        events: EventBus,
    ) -> Self {
        Self {
            bus,
            resolver,
            delivery,
            events,
            subscriptions: Arc::new(DashMap::new()),
            driver: Mutex::new(None),
        }
    }

    /// Start consuming for the configured strategy.
    pub async fn start(&self) -> Result<(), BusError> {
        match self.resolver.strategy() {
            TopicStrategy::Shared => {
                let topic = self.resolver.shared_topic().to_owned();
                let mut subscription = self.bus.subscribe(&topic).await?;
                let delivery = Arc::clone(&self.delivery);

                let driver = tokio::spawn(async move {
                    while let Some(record) = subscription.next().await {
                        let command: TellCommand = match serde_json::from_slice(&record.payload) {
                            Ok(command) => command,
                            Err(error) => {
                                warn!(%error, topic = %record.topic, "undecodable bus record");
                                continue;
                            }
                        };
                        // Shared topic: every service sees every record;
                        // deliver only what lives here.
                        if !delivery.is_local(&command.target_actor_id) {
                            continue;
                        }
                        if let Err(error) = delivery.deliver(command).await {
                            warn!(%error, "bus delivery rejected");
                        }
                    }
                });
                *self.driver.lock() = Some(driver);
            }
            TopicStrategy::PerActor => {
                for actor_id in self.delivery.local_ids() {
                    self.subscribe_actor(actor_id).await?;
                }

                let mut events = self.events.subscribe();
                let bus = Arc::clone(&self.bus);
                let resolver = self.resolver.clone();
                let delivery = Arc::clone(&self.delivery);
                let subscriptions = Arc::clone(&self.subscriptions);

                let driver = tokio::spawn(async move {
                    loop {
                        match events.recv().await {
                            Ok(event) => match event.kind {
                                PlatformEventKind::ActorCreated { actor_id, .. } => {
                                    if subscriptions.contains_key(&actor_id) {
                                        continue;
                                    }
                                    match spawn_actor_subscription(
                                        Arc::clone(&bus),
                                        &resolver,
                                        Arc::clone(&delivery),
                                        actor_id.clone(),
                                    )
                                    .await
                                    {
                                        Ok(handle) => {
                                            subscriptions.insert(actor_id, handle);
                                        }
                                        Err(error) => {
                                            warn!(%actor_id, %error, "bus subscription failed");
                                        }
                                    }
                                }
                                PlatformEventKind::ActorStopped { actor_id } => {
                                    if let Some((_, handle)) = subscriptions.remove(&actor_id) {
                                        handle.abort();
                                    }
                                }
                                _ => {}
                            },
                            Err(RecvError::Lagged(missed)) => {
                                warn!(missed, "event stream lagged, bus subscriptions may be stale");
                            }
                            Err(RecvError::Closed) => break,
                        }
                    }
                });
                *self.driver.lock() = Some(driver);
            }
        }
        Ok(())
    }

    /// Subscribe one actor's topic (per-actor strategy).
    pub async fn subscribe_actor(&self, actor_id: ActorId) -> Result<(), BusError> {
        if self.subscriptions.contains_key(&actor_id) {
            return Ok(());
        }
        let handle = spawn_actor_subscription(
            Arc::clone(&self.bus),
            &self.resolver,
            Arc::clone(&self.delivery),
            actor_id.clone(),
        )
        .await?;
        self.subscriptions.insert(actor_id, handle);
        Ok(())
    }

    /// Stop consuming and drop every subscription.
    pub fn stop(&self) {
        if let Some(driver) = self.driver.lock().take() {
            driver.abort();
        }
        for entry in self.subscriptions.iter() {
            entry.value().abort();
        }
        self.subscriptions.clear();
    }

    /// Number of live per-actor subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}

async fn spawn_actor_subscription(
    bus: Arc<dyn MessageBus>,
    resolver: &TopicResolver,
    delivery: Arc<dyn LocalDelivery>,
    actor_id: ActorId,
) -> Result<JoinHandle<()>, BusError> {
    let topic = resolver.topic_for(&actor_id);
    let mut subscription = bus.subscribe(&topic).await?;
    debug!(%actor_id, %topic, "bus subscription opened");

    Ok(tokio::spawn(async move {
        while let Some(record) = subscription.next().await {
            let command: TellCommand = match serde_json::from_slice(&record.payload) {
                Ok(command) => command,
                Err(error) => {
                    warn!(%error, topic = %record.topic, "undecodable bus record");
                    continue;
                }
            };
            if let Err(error) = delivery.deliver(command).await {
                warn!(%actor_id, %error, "bus delivery rejected");
            }
        }
    }))
}
