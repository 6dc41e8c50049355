//! Health monitoring of registered hosting services.
//!
//! A periodic sweep probes every service's `/health` endpoint and checks
//! heartbeat age. Transitions flip the service flag and bulk-flip the
//! availability of every actor it owns; a stale heartbeat overrides a
//! probe that accidentally succeeds.

// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use chrono::Utc;
use reqwest::Client;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

// Layer 3: Internal module imports
use crate::metrics::GatewayMetrics;
use crate::registry::{ActorRegistryHandle, ServiceRegistryHandle};
use actormesh_core::{EventBus, PlatformEventKind, ServiceRecord};

/// Periodic service prober.
pub struct HealthMonitor {
    services: ServiceRegistryHandle,
    actors: ActorRegistryHandle,
    events: EventBus,
    metrics: Arc<GatewayMetrics>,
    client: Client,
    probe_interval: Duration,
    dead_threshold: Duration,
}

impl HealthMonitor {
    /// Build a monitor.
    ///
    /// The probe timeout is half the probe interval, so a hung service
    /// cannot stall the sweep past its own period.
    pub fn new(
        services: ServiceRegistryHandle,
        actors: ActorRegistryHandle,
        events: EventBus,
        metrics: Arc<GatewayMetrics>,
        probe_interval: Duration,
        dead_threshold: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(probe_interval / 2)
            .timeout(probe_interval / 2)
            .build()?;
        Ok(Self {
            services,
            actors,
            events,
            metrics,
            client,
            probe_interval,
            dead_threshold,
        })
    }

    /// Spawn the periodic sweep task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.probe_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.sweep().await;
            }
        })
    }

    /// One full probe round over every registered service.
    pub async fn sweep(&self) {
        let services = match self.services.list().await {
            Ok(services) => services,
            Err(_) => return,
        };

        let mut unhealthy = 0i64;
        for service in services {
            let healthy_now = self.probe(&service).await;
            if !healthy_now {
                unhealthy += 1;
            }
            self.apply_transition(&service, healthy_now).await;
        }
        self.metrics.unhealthy_services.set(unhealthy);
    }

    /// Probe one service: HTTP liveness AND heartbeat freshness.
    async fn probe(&self, service: &ServiceRecord) -> bool {
        let heartbeat_age = service.heartbeat_age(Utc::now());
        let stale = heartbeat_age.num_milliseconds() as i128 > self.dead_threshold.as_millis() as i128;
        if stale {
            // A service whose heartbeats stopped is dead even when a probe
            // accidentally succeeds.
            debug!(
                service_id = %service.service_id,
                age_secs = heartbeat_age.num_seconds(),
                "heartbeat stale"
            );
            return false;
        }

        let url = format!("{}/health", service.service_url.trim_end_matches('/'));
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(error) => {
                debug!(service_id = %service.service_id, %error, "health probe failed");
                false
            }
        }
    }

    async fn apply_transition(&self, service: &ServiceRecord, healthy_now: bool) {
        if service.healthy == healthy_now {
            return;
        }

        if self
            .services
            .set_health(&service.service_id, healthy_now)
            .await
            .is_err()
        {
            return;
        }

        let flipped = self
            .actors
            .mark_service_availability(&service.service_id, healthy_now)
            .await
            .unwrap_or_default();

        if healthy_now {
            debug!(service_id = %service.service_id, recovered_actors = flipped.len(), "service recovered");
            self.events.publish(PlatformEventKind::ServiceRecovered {
                service_id: service.service_id.clone(),
            });
        } else {
            warn!(service_id = %service.service_id, orphaned_actors = flipped.len(), "service down");
            self.events.publish(PlatformEventKind::ServiceDown {
                service_id: service.service_id.clone(),
            });
        }
    }
}
