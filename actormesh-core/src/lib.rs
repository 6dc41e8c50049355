//! # actormesh-core - Shared Domain Types for the Actormesh Platform
//!
//! Wire-level and domain types shared by every actormesh crate: actor and
//! service identities, the message envelope and its payload codec, control
//! commands, registry records, platform events, the remote-transport
//! contract, and the shared-secret HTTP filter.
//!
//! Nothing in this crate owns state or spawns tasks (the [`event::EventBus`]
//! broadcast handle excepted); it exists so the runtime, transports, gateway
//! and hosting services agree on one vocabulary and one wire format.
//!
//! # Module Organization
//!
//! - [`ids`] - `ActorId`, `ServiceId`, `MessageId` newtypes
//! - [`envelope`] - the message envelope wire form
//! - [`payload`] - tag-to-decoder registry for reifying payloads
//! - [`command`] - tell/create/register wire commands
//! - [`record`] - registry records, statuses, health snapshots
//! - [`event`] - platform lifecycle events and the broadcast bus
//! - [`error`] - machine-readable error codes and problem bodies
//! - [`transport`] - the `RemoteTransport` contract
//! - [`auth`] - `X-API-KEY` shared-secret filter
//! - [`config`] - bus and timeout configuration shared across processes

pub mod auth;
pub mod command;
pub mod config;
pub mod envelope;
pub mod error;
pub mod event;
pub mod ids;
pub mod payload;
pub mod record;
pub mod transport;

// Re-export commonly used types
pub use auth::{require_api_key, SharedSecret, API_KEY_HEADER};
pub use command::{
    CreateActorRequest, CreateCommand, CreatedActor, HeartbeatRequest, Params,
    RegisterServiceRequest, TellCommand, TellOutcome,
};
pub use config::{BusConfig, BusKind, TopicStrategy, HTTP_CONNECT_TIMEOUT, HTTP_READ_TIMEOUT};
pub use envelope::Envelope;
pub use error::{ErrorCode, Problem};
pub use event::{EventBus, PlatformEvent, PlatformEventKind};
pub use ids::{ActorId, MessageId, ServiceId};
pub use payload::{DecodedPayload, PayloadCodec, PayloadError};
pub use record::{ActorHealth, ActorRecord, ActorStatus, LifecycleState, ServiceRecord};
pub use transport::{RemoteAddress, RemoteTransport, TransportError};
