//! Typed actor factory: the per-service plugin contract.
//!
//! A hosting service declares the actor types it can instantiate by
//! building a [`TypedActorFactory`] at startup: an explicit map from type
//! string to constructor closure. No classpath scanning, no reflection;
//! the set of supported types is closed and known at boot, which is also
//! what the service advertises when it registers with the control plane.

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::actor::traits::Actor;
use actormesh_core::Params;

/// Factory failures.
#[derive(Error, Debug)]
pub enum FactoryError {
    /// No constructor registered for the type string
    #[error("unknown actor type: {0}")]
    UnknownType(String),

    /// The constructor rejected the creation parameters
    #[error("failed to construct '{actor_type}': {message}")]
    Construction { actor_type: String, message: String },
}

impl FactoryError {
    /// Convenience constructor for parameter validation failures.
    pub fn construction(actor_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Construction {
            actor_type: actor_type.into(),
            message: message.into(),
        }
    }
}

/// The plugin contract a hosting service provides to its ActorSystem.
pub trait ActorFactory: Send + Sync {
    /// Whether this factory can instantiate the type.
    fn supports(&self, actor_type: &str) -> bool;

    /// Build a fresh instance from creation parameters.
    fn create(&self, actor_type: &str, params: &Params) -> Result<Box<dyn Actor>, FactoryError>;

    /// All types this factory supports, advertised at registration.
    fn supported_types(&self) -> Vec<String>;
}

type Constructor = Box<dyn Fn(&Params) -> Result<Box<dyn Actor>, FactoryError> + Send + Sync>;

/// Factory over an explicit type -> constructor map.
///
/// # Example
/// ```rust,ignore
/// let factory = TypedActorFactory::new()
///     .register("EchoActor", |_params| Ok(Box::new(EchoActor::default()) as Box<dyn Actor>))
///     .register("CapteurActor", |params| CapteurActor::from_params(params));
/// ```
#[derive(Default)]
pub struct TypedActorFactory {
    constructors: HashMap<String, Constructor>,
}

impl TypedActorFactory {
    /// Create an empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for a type string, replacing any previous
    /// registration.
    pub fn register<F>(mut self, actor_type: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&Params) -> Result<Box<dyn Actor>, FactoryError> + Send + Sync + 'static,
    {
        self.constructors
            .insert(actor_type.into(), Box::new(constructor));
        self
    }
}

impl ActorFactory for TypedActorFactory {
    fn supports(&self, actor_type: &str) -> bool {
        self.constructors.contains_key(actor_type)
    }

    fn create(&self, actor_type: &str, params: &Params) -> Result<Box<dyn Actor>, FactoryError> {
        match self.constructors.get(actor_type) {
            Some(constructor) => constructor(params),
            None => Err(FactoryError::UnknownType(actor_type.to_owned())),
        }
    }

    fn supported_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.constructors.keys().cloned().collect();
        types.sort();
        types
    }
}

/// Chains several factories; the first one supporting a type wins.
#[derive(Default)]
pub struct CompositeFactory {
    factories: Vec<Box<dyn ActorFactory>>,
}

impl CompositeFactory {
    /// Create an empty composite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a delegate factory.
    pub fn with(mut self, factory: impl ActorFactory + 'static) -> Self {
        self.factories.push(Box::new(factory));
        self
    }
}

impl ActorFactory for CompositeFactory {
    fn supports(&self, actor_type: &str) -> bool {
        self.factories.iter().any(|f| f.supports(actor_type))
    }

    fn create(&self, actor_type: &str, params: &Params) -> Result<Box<dyn Actor>, FactoryError> {
        match self.factories.iter().find(|f| f.supports(actor_type)) {
            Some(factory) => factory.create(actor_type, params),
            None => Err(FactoryError::UnknownType(actor_type.to_owned())),
        }
    }

    fn supported_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .factories
            .iter()
            .flat_map(|f| f.supported_types())
            .collect();
        types.sort();
        types.dedup();
        types
    }
}
