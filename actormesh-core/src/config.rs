// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
// (none)

/// Connect timeout for every outbound control-plane HTTP call.
pub const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Read timeout for every outbound control-plane HTTP call.
pub const HTTP_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Default shared topic when the shared strategy is selected.
pub const DEFAULT_SHARED_TOPIC: &str = "actor-messages";

/// Which streaming bus (if any) carries inter-actor traffic.
///
/// External brokers integrate by implementing the bus trait in
/// `actormesh-transport`; the platform itself only ships the in-memory bus
/// used for single-process deployments and tests. With `None`, inter-actor
/// delivery falls back to the HTTP transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BusKind {
    /// No bus: data plane falls back to HTTP
    None,

    /// In-process bus (single-process deployments, tests)
    Memory,
}

impl Default for BusKind {
    fn default() -> Self {
        Self::None
    }
}

/// Topic naming strategy for bus delivery.
///
/// Producers and consumers must agree on one strategy; it is fixed at
/// configuration time for the whole deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TopicStrategy {
    /// One topic per actor: `actor-<actor_id>`. Preserves per-actor order.
    PerActor,

    /// One shared topic, record key = target actor id. Per-actor order
    /// holds only when the bus keeps same-key records in one partition.
    Shared,
}

impl Default for TopicStrategy {
    fn default() -> Self {
        Self::PerActor
    }
}

/// Bus section of a process configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Bus selection
    pub kind: BusKind,

    /// Topic naming strategy
    pub topic_strategy: TopicStrategy,

    /// Topic name used by the shared strategy
    pub shared_topic: String,

    /// Broker bootstrap address, passed through to bus implementations
    pub bootstrap: Option<String>,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            kind: BusKind::default(),
            topic_strategy: TopicStrategy::default(),
            shared_topic: DEFAULT_SHARED_TOPIC.to_owned(),
            bootstrap: None,
        }
    }
}

impl BusConfig {
    /// Whether a bus carries the data plane in this deployment.
    pub fn is_enabled(&self) -> bool {
        self.kind != BusKind::None
    }
}
