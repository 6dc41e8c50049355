//! Prometheus counters for the control plane.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use prometheus::{Encoder, IntCounter, IntGauge, Opts, Registry, TextEncoder};

// Layer 3: Internal module imports
// (none)

const NAMESPACE: &str = "actormesh_gateway";

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

/// Gateway metrics over a private registry (no global-registry collisions
/// between instances in tests).
pub struct GatewayMetrics {
    registry: Registry,
    pub actors_created: IntCounter,
    pub actors_deleted: IntCounter,
    pub tells_forwarded: IntCounter,
    pub tells_rejected: IntCounter,
    pub services_registered: IntCounter,
    pub unhealthy_services: IntGauge,
}

impl GatewayMetrics {
    /// Create and register every metric.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        Ok(Self {
            actors_created: new_counter(&registry, "actors_created_total", "Actors created")?,
            actors_deleted: new_counter(&registry, "actors_deleted_total", "Actors deleted")?,
            tells_forwarded: new_counter(
                &registry,
                "tells_forwarded_total",
                "Tell commands forwarded to hosting services",
            )?,
            tells_rejected: new_counter(
                &registry,
                "tells_rejected_total",
                "Tell commands rejected (missing or unavailable targets)",
            )?,
            services_registered: new_counter(
                &registry,
                "services_registered_total",
                "Service registrations accepted",
            )?,
            unhealthy_services: new_gauge(
                &registry,
                "unhealthy_services",
                "Services currently flagged down",
            )?,
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_render_with_namespace() {
        let metrics = GatewayMetrics::new().unwrap();
        metrics.actors_created.inc();
        metrics.tells_forwarded.inc_by(3);
        metrics.unhealthy_services.set(2);

        let text = metrics.render();
        assert!(text.contains("actormesh_gateway_actors_created_total 1"));
        assert!(text.contains("actormesh_gateway_tells_forwarded_total 3"));
        assert!(text.contains("actormesh_gateway_unhealthy_services 2"));
    }

    #[test]
    fn test_two_instances_do_not_collide() {
        let _a = GatewayMetrics::new().unwrap();
        let _b = GatewayMetrics::new().unwrap();
    }
}
