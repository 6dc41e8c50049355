//! # actormesh-transport - Remote Message Transports
//!
//! The two implementations of the platform's
//! [`RemoteTransport`](actormesh_core::RemoteTransport) contract:
//!
//! - [`http::HttpRemoteTransport`] - the synchronous control path. Targets
//!   a hosting service URL, speaks the `/runtime` facade endpoints, carries
//!   the shared-secret header, and is the only transport offering `ask`.
//! - [`bus::BusRemoteTransport`] - the asynchronous data path. Targets an
//!   actor id alone, resolves a topic by the configured strategy, and
//!   publishes tell commands on a [`bus::MessageBus`]. Fire-and-forget
//!   only: `ask`, `exists`, `stop` and `state` answer `Unsupported`.
//!
//! The crate ships an in-memory bus for single-process deployments and
//! tests; external brokers integrate by implementing [`bus::MessageBus`]
//! and [`bus::BusSubscription`]. The consumer side
//! ([`bus::BusConsumer`]) re-enqueues decoded tell commands through the
//! [`bus::LocalDelivery`] seam the hosting service implements over its
//! actor system.

pub mod bus;
pub mod http;

pub use bus::{
    BusConsumer, BusError, BusRecord, BusRemoteTransport, BusSubscription, DeliveryError,
    InMemoryBus, LocalDelivery, MessageBus, TopicResolver,
};
pub use http::HttpRemoteTransport;
