//! Gateway process configuration.

// Layer 1: Standard library
use std::time::Duration;

// Layer 2: Third-party
use serde::{Deserialize, Serialize};

// Layer 3: Internal
// (none)

/// Default heartbeat cadence expected from hosting services (seconds).
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Default health probe interval (seconds).
pub const DEFAULT_PROBE_INTERVAL_SECS: u64 = 10;

/// Configuration of the gateway process.
///
/// Loaded from an optional TOML file layered under `ACTORMESH_`-prefixed
/// environment variables (`ACTORMESH_API_KEY`, `ACTORMESH_LISTEN_ADDR`,
/// ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Bind address of the public API
    pub listen_addr: String,

    /// Shared secret for `/api/v1/**`; empty disables the check (dev mode)
    pub api_key: String,

    /// Health probe interval (seconds)
    pub probe_interval_secs: u64,

    /// Heartbeat cadence hosting services are expected to keep (seconds)
    pub heartbeat_interval_secs: u64,

    /// Heartbeat age beyond which a service counts as dead even when a
    /// probe succeeds (seconds); defaults to twice the heartbeat cadence
    pub service_dead_threshold_secs: Option<u64>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_owned(),
            api_key: String::new(),
            probe_interval_secs: DEFAULT_PROBE_INTERVAL_SECS,
            heartbeat_interval_secs: DEFAULT_HEARTBEAT_INTERVAL_SECS,
            service_dead_threshold_secs: None,
        }
    }
}

impl GatewayConfig {
    /// Load configuration: optional TOML file under environment overrides.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        builder = match path {
            Some(path) => builder.add_source(config::File::with_name(path)),
            None => builder.add_source(config::File::with_name("gateway").required(false)),
        };
        builder
            .add_source(config::Environment::with_prefix("ACTORMESH").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Probe interval as a duration.
    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs.max(1))
    }

    /// Effective dead threshold: configured, or twice the heartbeat.
    pub fn dead_threshold(&self) -> Duration {
        Duration::from_secs(
            self.service_dead_threshold_secs
                .unwrap_or(self.heartbeat_interval_secs * 2)
                .max(1),
        )
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.trim().is_empty() {
            return Err("listen_addr must not be empty".to_owned());
        }
        if self.probe_interval_secs == 0 {
            return Err("probe_interval_secs must be > 0".to_owned());
        }
        if self.dead_threshold() < Duration::from_secs(self.heartbeat_interval_secs) {
            return Err(
                "service_dead_threshold_secs must be at least the heartbeat interval".to_owned(),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.probe_interval(), Duration::from_secs(10));
        assert_eq!(config.dead_threshold(), Duration::from_secs(60));
    }

    #[test]
    fn test_explicit_threshold_wins() {
        let config = GatewayConfig {
            service_dead_threshold_secs: Some(90),
            ..GatewayConfig::default()
        };
        assert_eq!(config.dead_threshold(), Duration::from_secs(90));
    }

    #[test]
    fn test_threshold_below_heartbeat_rejected() {
        let config = GatewayConfig {
            service_dead_threshold_secs: Some(5),
            ..GatewayConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
