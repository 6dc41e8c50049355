//! Prometheus counters for a hosting service.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use prometheus::{Encoder, IntCounter, IntGauge, Opts, Registry, TextEncoder};

// Layer 3: Internal module imports
// (none)

const NAMESPACE: &str = "actormesh_host";

fn new_counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, prometheus::Error> {
    let counter = IntCounter::with_opts(Opts::new(name, help).namespace(NAMESPACE))?;
    registry.register(Box::new(counter.clone()))?;
    Ok(counter)
}

fn new_gauge(registry: &Registry, name: &str, help: &str) -> Result<IntGauge, prometheus::Error> {
    let gauge = IntGauge::with_opts(Opts::new(name, help).namespace(NAMESPACE))?;
    registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

/// Host metrics over a private registry.
pub struct HostMetrics {
    registry: Registry,
    pub actors_spawned: IntCounter,
    pub actors_stopped: IntCounter,
    pub tells_received: IntCounter,
    pub asks_served: IntCounter,
    pub live_actors: IntGauge,
    pub dead_letters: IntGauge,
}

impl HostMetrics {
    /// Create and register every metric.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        Ok(Self {
            actors_spawned: new_counter(&registry, "actors_spawned_total", "Actors spawned")?,
            actors_stopped: new_counter(&registry, "actors_stopped_total", "Actors stopped")?,
            tells_received: new_counter(
                &registry,
                "tells_received_total",
                "Tell commands accepted by the facade",
            )?,
            asks_served: new_counter(&registry, "asks_served_total", "Asks answered")?,
            live_actors: new_gauge(&registry, "live_actors", "Currently hosted actors")?,
            dead_letters: new_gauge(&registry, "dead_letters", "Dead letters since start")?,
            registry,
        })
    }

    /// Text exposition of every registered metric.
    pub fn render(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .is_err()
        {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}
