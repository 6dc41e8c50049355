// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use actormesh_core::{ActorId, TellCommand};
use actormesh_rt::ActorSystem;
use actormesh_transport::{DeliveryError, LocalDelivery};

/// Bus-consumer delivery seam over the local actor system.
#[derive(Clone)]
pub struct SystemDelivery {
    system: ActorSystem,
}

impl SystemDelivery {
    pub fn new(system: ActorSystem) -> Self {
        Self { system }
    }
}

#[async_trait]
impl LocalDelivery for SystemDelivery {
    async fn deliver(&self, command: TellCommand) -> Result<(), DeliveryError> {
        let TellCommand {
            target_actor_id,
            sender_actor_id,
            message,
        } = command;
        self.system
            .tell(&target_actor_id, message, sender_actor_id)
            .await
            .map_err(|error| DeliveryError(error.to_string()))
    }

    fn is_local(&self, actor_id: &ActorId) -> bool {
        self.system.has(actor_id)
    }

    fn local_ids(&self) -> Vec<ActorId> {
        self.system.all_ids()
    }
}
