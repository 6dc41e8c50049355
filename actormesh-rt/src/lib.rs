//! # actormesh-rt - Process-Local Actor Runtime
//!
//! The runtime half of the actormesh platform: per-actor mailboxes with
//! strict FIFO and at-most-one concurrent receive, a lifecycle state
//! machine, supervision with restart budgets, a typed factory contract, and
//! the [`ActorSystem`] that owns every actor in one hosting process.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use actormesh_rt::prelude::*;
//! use actormesh_core::Envelope;
//! use async_trait::async_trait;
//!
//! struct Counter { seen: u64 }
//!
//! #[async_trait]
//! impl Actor for Counter {
//!     async fn receive(
//!         &mut self,
//!         _envelope: Envelope,
//!         _context: &mut ActorContext,
//!     ) -> Result<(), ActorError> {
//!         self.seen += 1;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), SystemError> {
//!     let factory = TypedActorFactory::new()
//!         .register("Counter", |_params| Ok(Box::new(Counter { seen: 0 }) as Box<dyn Actor>));
//!     let system = ActorSystem::new(RuntimeConfig::default(), "my-service", factory);
//!
//!     let actor = system.spawn(SpawnRequest::of_type("Counter")).await?;
//!     actor.tell(Envelope::new("tick", serde_json::Value::Null), None).await?;
//!
//!     system.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Execution Model
//!
//! Every spawned actor runs on its own tokio task reading from a channel
//! mailbox, so at-most-one concurrent `receive` per actor holds by
//! construction and user code never takes a lock. The run loop processes at
//! most `throughput_per_run` envelopes before yielding back to the
//! scheduler, which keeps one busy actor from monopolizing a worker.
//!
//! # Module Organization
//!
//! - [`actor`] - Actor trait, context, errors, lifecycle state machine
//! - [`mailbox`] - FIFO queues, metrics, dead-letter sink
//! - [`supervision`] - directives, strategies, restart windows
//! - [`dispatch`] - the per-actor run loop
//! - [`factory`] - typed actor factory contract
//! - [`refs`] - local and remote actor handles
//! - [`push`] - outbound push sinks for external observers
//! - [`system`] - the ActorSystem and its configuration

pub mod actor;
pub mod dispatch;
pub mod factory;
pub mod mailbox;
pub mod push;
pub mod refs;
pub mod supervision;
pub mod system;

pub mod prelude;

// Re-export commonly used types
pub use actor::{Actor, ActorContext, ActorError, Lifecycle, SharedLifecycle};
pub use factory::{ActorFactory, CompositeFactory, FactoryError, TypedActorFactory};
pub use mailbox::{
    DeadLetter, DeadLetterReason, DeadLetterSink, Delivery, Mailbox, MailboxError, MailboxMetrics,
    MailboxSender,
};
pub use push::{PushError, PushRegistry, PushSink};
pub use refs::{ActorRef, LocalActorRef, RefError, RemoteActorRef, WatchToken};
pub use supervision::{Directive, RestartWindow, SupervisionStrategy, SupervisorScope};
pub use system::{ActorSystem, EscalationHandler, RuntimeConfig, SpawnRequest, SystemError};
