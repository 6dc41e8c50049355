//! Built-in actor types.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

// Layer 3: Internal module imports
use actormesh_core::Envelope;
use actormesh_rt::{Actor, ActorContext, ActorError, TypedActorFactory};

/// Minimal default actor type every hosting service ships: counts what it
/// sees, answers asks with a pong, and forwards updates to an attached
/// external observer when one is registered.
#[derive(Debug, Default)]
pub struct EchoActor {
    seen: u64,
}

#[async_trait]
impl Actor for EchoActor {
    async fn receive(
        &mut self,
        envelope: Envelope,
        context: &mut ActorContext,
    ) -> Result<(), ActorError> {
        self.seen += 1;
        debug!(actor_id = %context.actor_id(), seen = self.seen, message_type = %envelope.message_type, "echo");

        let reply = Envelope::new(
            "echo.Pong",
            json!({ "seen": self.seen, "echoed": envelope.payload }),
        );
        if !context.reply(reply.clone()) {
            // Nobody is asking; still push to an attached observer.
            context
                .push_update(&reply)
                .await
                .map_err(|error| ActorError::with_source("push", error))?;
        }
        Ok(())
    }
}

/// The default factory for a hosting service.
pub fn default_factory() -> TypedActorFactory {
    TypedActorFactory::new().register("EchoActor", |_params| {
        Ok(Box::new(EchoActor::default()) as Box<dyn Actor>)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use actormesh_rt::ActorFactory;

    #[test]
    fn test_default_factory_supports_echo() {
        let factory = default_factory();
        assert!(factory.supports("EchoActor"));
        assert_eq!(factory.supported_types(), ["EchoActor"]);
    }
}
