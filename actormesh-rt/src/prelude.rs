//! Convenience re-exports for building hosting services.

pub use crate::actor::{Actor, ActorContext, ActorError};
pub use crate::factory::{ActorFactory, FactoryError, TypedActorFactory};
pub use crate::refs::{ActorRef, LocalActorRef};
pub use crate::supervision::{Directive, SupervisionStrategy, SupervisorScope};
pub use crate::system::{ActorSystem, RuntimeConfig, SpawnRequest, SystemError};

pub use actormesh_core::{ActorId, Envelope, LifecycleState, ServiceId};
