//! Single-owner registry tasks.

pub mod actor_registry;
pub mod service_registry;

// Layer 2: Third-party crate imports
use thiserror::Error;

pub use actor_registry::ActorRegistryHandle;
pub use service_registry::{Registered, ServiceRegistryHandle};

/// Registry handle failures.
///
/// The only way a handle fails is the owning task being gone, which only
/// happens during process shutdown.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("registry task unavailable")]
    Closed,
}
