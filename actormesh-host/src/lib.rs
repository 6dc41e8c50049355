//! # actormesh-host - Hosting Service
//!
//! Everything one actor-hosting process needs around its
//! [`ActorSystem`](actormesh_rt::ActorSystem): the internal `/runtime`
//! HTTP facade the control plane calls, the registration client that
//! announces the service to the gateway and keeps heartbeating, the
//! bus-delivery glue, and a minimal default actor type.
//!
//! # Module Organization
//!
//! - [`facade`] - the `/runtime` axum surface over the local system
//! - [`registration`] - register + heartbeat loop with backoff
//! - [`delivery`] - `LocalDelivery` implementation for the bus consumer
//! - [`actors`] - built-in actor types (`EchoActor`)
//! - [`metrics`] - prometheus counters
//! - [`config`] - host process configuration

pub mod actors;
pub mod config;
pub mod delivery;
pub mod facade;
pub mod metrics;
pub mod registration;

pub use actors::{default_factory, EchoActor};
pub use config::HostConfig;
pub use delivery::SystemDelivery;
pub use facade::{facade_router, FacadeState};
pub use metrics::HostMetrics;
pub use registration::RegistrationClient;
