//! # actormesh-gateway - Control Plane
//!
//! The public face of the platform: the authoritative actor and service
//! registries, the health monitor that flips availability, and the
//! versioned HTTP API clients talk to.
//!
//! Both registries follow a single-owner design: one task owns the map and
//! its secondary index and consumes commands from a channel, replying over
//! oneshots. There is no shared mutable registry state and no ad-hoc
//! locking; handles are cheap clones of the command sender.
//!
//! # Module Organization
//!
//! - [`registry`] - actor and service registry tasks and their handles
//! - [`health`] - periodic liveness probing and availability propagation
//! - [`api`] - the `/api/v1` axum surface, auth filter, problem mapping
//! - [`metrics`] - prometheus registry and counters
//! - [`config`] - gateway process configuration

pub mod api;
pub mod config;
pub mod health;
pub mod metrics;
pub mod registry;

pub use api::{router, AppState};
pub use config::GatewayConfig;
pub use health::HealthMonitor;
pub use metrics::GatewayMetrics;
pub use registry::{ActorRegistryHandle, RegistryError, ServiceRegistryHandle};
