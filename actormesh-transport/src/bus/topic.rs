// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use actormesh_core::{ActorId, BusConfig, TopicStrategy};

/// Deterministic topic/key mapping for bus delivery.
///
/// Producers and consumers across every service must agree on one
/// strategy, fixed at configuration time:
///
/// - per-actor: topic `actor-<actor_id>`, no key; ordering per actor
///   follows from topic ordering.
/// - shared: one fixed topic, key = target actor id; ordering per actor
///   holds only when the bus keeps same-key records in one partition.
#[derive(Debug, Clone)]
pub struct TopicResolver {
    strategy: TopicStrategy,
    shared_topic: String,
}

impl TopicResolver {
    /// Build from the bus section of a process configuration.
    pub fn from_config(config: &BusConfig) -> Self {
        Self {
            strategy: config.topic_strategy,
            shared_topic: config.shared_topic.clone(),
        }
    }

    /// Build a per-actor resolver.
    pub fn per_actor() -> Self {
        Self {
            strategy: TopicStrategy::PerActor,
            shared_topic: String::new(),
        }
    }

    /// Build a shared-topic resolver.
    pub fn shared(topic: impl Into<String>) -> Self {
        Self {
            strategy: TopicStrategy::Shared,
            shared_topic: topic.into(),
        }
    }

    /// The configured strategy.
    pub fn strategy(&self) -> TopicStrategy {
        self.strategy
    }

    /// Topic a tell for `target` is published on.
    pub fn topic_for(&self, target: &ActorId) -> String {
        match self.strategy {
            TopicStrategy::PerActor => format!("actor-{target}"),
            TopicStrategy::Shared => self.shared_topic.clone(),
        }
    }

    /// The shared topic name (empty under the per-actor strategy).
    pub fn shared_topic(&self) -> &str {
        &self.shared_topic
    }

    /// Partition key for a tell to `target`.
    pub fn key_for(&self, target: &ActorId) -> Option<String> {
        match self.strategy {
            TopicStrategy::PerActor => None,
            TopicStrategy::Shared => Some(target.to_string()),
        }
    }
}
