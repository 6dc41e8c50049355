//! Basic Actor Example - Spawning and Messaging Fundamentals
//!
//! This example demonstrates the fundamentals of hosting actors with
//! actormesh-rt: building a typed factory, spawning through the
//! ActorSystem, fire-and-forget tells, request-reply, and shutdown.
//!
//! # What You'll Learn
//!
//! - Implementing the `Actor` trait with `receive` and lifecycle hooks
//! - Registering constructors in a `TypedActorFactory`
//! - Spawning actors with `SpawnRequest` (ids, params)
//! - Sending envelopes with `tell` and waiting for replies with `ask`
//! - Graceful system shutdown
//!
//! # Run This Example
//!
//! ```bash
//! cargo run --example actor_basic
//! ```

use std::time::Duration;

use actormesh_core::{ActorId, Envelope};
use actormesh_rt::{
    Actor, ActorContext, ActorError, ActorSystem, RuntimeConfig, SpawnRequest, TypedActorFactory,
};
use async_trait::async_trait;
use serde_json::json;

/// Accumulates a running total from `counter.Add` envelopes and answers
/// `counter.Get` asks with the current value.
struct CounterActor {
    value: i64,
}

#[async_trait]
impl Actor for CounterActor {
    async fn receive(
        &mut self,
        envelope: Envelope,
        context: &mut ActorContext,
    ) -> Result<(), ActorError> {
        match envelope.message_type.as_str() {
            "counter.Add" => {
                let delta = envelope
                    .payload
                    .get("delta")
                    .and_then(|v| v.as_i64())
                    .ok_or_else(|| ActorError::new("validation", "missing 'delta'"))?;
                self.value += delta;
                println!("[{}] value is now {}", context.actor_id(), self.value);
                Ok(())
            }
            "counter.Get" => {
                context.reply(Envelope::new("counter.Value", json!({ "value": self.value })));
                Ok(())
            }
            other => Err(ActorError::new("validation", format!("unknown message: {other}"))),
        }
    }

    async fn pre_start(&mut self, context: &mut ActorContext) -> Result<(), ActorError> {
        println!("[{}] starting with value {}", context.actor_id(), self.value);
        Ok(())
    }

    async fn post_stop(&mut self, context: &mut ActorContext) -> Result<(), ActorError> {
        println!("[{}] stopped at value {}", context.actor_id(), self.value);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let factory = TypedActorFactory::new().register("CounterActor", |params| {
        let initial = params.get("initial").and_then(|v| v.as_i64()).unwrap_or(0);
        Ok(Box::new(CounterActor { value: initial }) as Box<dyn Actor>)
    });

    let system = ActorSystem::new(RuntimeConfig::default(), "example-service", factory);

    let mut params = actormesh_core::Params::new();
    params.insert("initial".to_owned(), json!(100));
    let counter = system
        .spawn(
            SpawnRequest::of_type("CounterActor")
                .with_id(ActorId::new("counter-1"))
                .with_params(params),
        )
        .await?;

    for delta in [10, 20, 15] {
        counter
            .tell(Envelope::new("counter.Add", json!({ "delta": delta })), None)
            .await?;
    }

    let reply = system
        .ask(
            counter.id(),
            Envelope::new("counter.Get", json!({})),
            Duration::from_secs(1),
        )
        .await?;
    println!("ask answered: {}", reply.payload);

    system.shutdown().await?;
    Ok(())
}
