//! Supervision Example - Restart Budgets and Directives
//!
//! Demonstrates how an uncaught error in `receive` drives supervision: a
//! kind-matched rule maps the failure to RESTART, the instance is replaced
//! through the factory, and the mailbox survives untouched.
//!
//! # Run This Example
//!
//! ```bash
//! cargo run --example supervision_basic
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use actormesh_core::Envelope;
use actormesh_rt::{
    Actor, ActorContext, ActorError, ActorSystem, Directive, RuntimeConfig, SpawnRequest,
    SupervisionStrategy, TypedActorFactory,
};
use async_trait::async_trait;
use serde_json::json;

/// Fails once on the flagged message, then keeps working after its
/// replacement instance takes over.
struct FragileWorker {
    generation: u64,
    attempts: Arc<AtomicU64>,
}

#[async_trait]
impl Actor for FragileWorker {
    async fn receive(
        &mut self,
        envelope: Envelope,
        _context: &mut ActorContext,
    ) -> Result<(), ActorError> {
        if envelope.message_type == "work.Poison"
            && self.attempts.fetch_add(1, Ordering::SeqCst) == 0
        {
            return Err(ActorError::new("illegal_state", "poison pill"));
        }
        println!(
            "generation {} handled {}",
            self.generation, envelope.message_type
        );
        Ok(())
    }

    async fn post_restart(
        &mut self,
        cause: &ActorError,
        _context: &mut ActorContext,
    ) -> Result<(), ActorError> {
        println!("replacement instance up after: {cause}");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let generation = Arc::new(AtomicU64::new(0));
    let attempts = Arc::new(AtomicU64::new(0));

    let factory = TypedActorFactory::new().register("FragileWorker", {
        let generation = Arc::clone(&generation);
        let attempts = Arc::clone(&attempts);
        move |_params| {
            Ok(Box::new(FragileWorker {
                generation: generation.fetch_add(1, Ordering::SeqCst),
                attempts: Arc::clone(&attempts),
            }) as Box<dyn Actor>)
        }
    });

    let system = ActorSystem::new(RuntimeConfig::default(), "example-service", factory);

    let strategy = SupervisionStrategy::one_for_one()
        .with_rule("illegal_state", Directive::Restart)
        .with_restart_budget(3, Duration::from_secs(60));
    let worker = system
        .spawn(SpawnRequest::of_type("FragileWorker").with_strategy(strategy))
        .await?;

    worker
        .tell(Envelope::new("work.Task", json!({ "n": 1 })), None)
        .await?;
    worker
        .tell(Envelope::new("work.Poison", json!({})), None)
        .await?;
    worker
        .tell(Envelope::new("work.Task", json!({ "n": 2 })), None)
        .await?;

    tokio::time::sleep(Duration::from_millis(200)).await;
    system.shutdown().await?;
    Ok(())
}
