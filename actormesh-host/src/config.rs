//! Hosting service configuration.

// Layer 1: Standard library
use std::time::Duration;

// Layer 2: Third-party
use serde::{Deserialize, Serialize};

// Layer 3: Internal
use actormesh_core::BusConfig;
use actormesh_rt::RuntimeConfig;

/// Default heartbeat cadence (seconds); must stay below the gateway's
/// dead threshold.
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Configuration of one hosting service process.
///
/// `service_id`, `service_public_url` and `gateway_url` are required;
/// startup fails with a non-zero exit code without them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Bind address of the `/runtime` facade
    pub listen_addr: String,

    /// Stable name of this hosting service
    pub service_id: String,

    /// URL under which the gateway can reach this process
    pub service_public_url: String,

    /// Where to register and heartbeat
    pub gateway_url: String,

    /// Shared secret; empty disables the facade check (dev mode)
    pub api_key: String,

    /// Heartbeat cadence (seconds)
    pub heartbeat_interval_secs: u64,

    /// Local runtime tuning
    pub runtime: RuntimeConfig,

    /// Streaming-bus section
    pub bus: BusConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8086".to_owned(),
            service_id: String::new(),
            service_public_url: String::new(),
            gateway_url: String::new(),
            api_key: String::new(),
            heartbeat_interval_secs: DEFAULT_HEARTBEAT_INTERVAL_SECS,
            runtime: RuntimeConfig::default(),
            bus: BusConfig::default(),
        }
    }
}

impl HostConfig {
    /// Load configuration: optional TOML file under environment overrides
    /// (`ACTORMESH_SERVICE_ID`, `ACTORMESH_BUS__KIND`, ...).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        builder = match path {
            Some(path) => builder.add_source(config::File::with_name(path)),
            None => builder.add_source(config::File::with_name("host").required(false)),
        };
        builder
            .add_source(config::Environment::with_prefix("ACTORMESH").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Heartbeat cadence as a duration.
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs.max(1))
    }

    /// Validate required values.
    pub fn validate(&self) -> Result<(), String> {
        if self.service_id.trim().is_empty() {
            return Err("service_id is required".to_owned());
        }
        if self.service_public_url.trim().is_empty() {
            return Err("service_public_url is required".to_owned());
        }
        if self.gateway_url.trim().is_empty() {
            return Err("gateway_url is required".to_owned());
        }
        if self.listen_addr.trim().is_empty() {
            return Err("listen_addr must not be empty".to_owned());
        }
        self.runtime.validate()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn complete() -> HostConfig {
        HostConfig {
            service_id: "capteur-service".to_owned(),
            service_public_url: "http://h:8086".to_owned(),
            gateway_url: "http://gateway:8080".to_owned(),
            ..HostConfig::default()
        }
    }

    #[test]
    fn test_required_fields_enforced() {
        assert!(HostConfig::default().validate().is_err());
        assert!(complete().validate().is_ok());

        let mut missing_gateway = complete();
        missing_gateway.gateway_url = String::new();
        assert!(missing_gateway.validate().is_err());
    }

    #[test]
    fn test_heartbeat_interval_floor() {
        let mut config = complete();
        config.heartbeat_interval_secs = 0;
        assert_eq!(config.heartbeat_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_toml_roundtrip_with_bus_section() {
        let config = complete();
        let toml = toml::to_string(&config).unwrap();
        let back: HostConfig = toml::from_str(&toml).unwrap();
        assert_eq!(back.bus, config.bus);
        assert_eq!(back.service_id, config.service_id);
    }
}
