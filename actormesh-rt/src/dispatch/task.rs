// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

// Layer 3: Internal module imports
use crate::actor::context::ActorContext;
use crate::actor::error::ActorError;
use crate::actor::lifecycle::SharedLifecycle;
use crate::actor::traits::Actor;
use crate::factory::ActorFactory;
use crate::mailbox::{DeadLetterReason, DeadLetterSink, Delivery, Mailbox};
use crate::refs::Watchers;
use crate::supervision::{Directive, RestartWindow, SupervisionStrategy, SupervisorScope};
use crate::system::SystemRef;
use actormesh_core::{ActorId, EventBus, LifecycleState, Params, PlatformEventKind};

/// Control signals delivered out of band of the mailbox.
pub(crate) enum Control {
    /// Finish the in-flight receive, dead-letter the queue, run post_stop.
    Stop { done: Option<oneshot::Sender<()>> },

    /// Replace the instance via the factory; the mailbox survives.
    Restart {
        cause: ActorError,
        done: Option<oneshot::Sender<bool>>,
    },

    /// Resolve a Failed actor back to Running (escalation outcome).
    Resume,
}

/// Failure reports flowing from actor tasks to the system supervisor.
pub(crate) enum Escalation {
    /// ESCALATE directive: the service-level handler decides.
    Upward {
        actor_id: ActorId,
        kind: String,
        message: String,
    },

    /// AllForOne scope: apply the directive to the whole spawn group.
    Group {
        group: String,
        origin: ActorId,
        directive: Directive,
        message: String,
    },
}

/// Whether the run loop keeps going after handling an event.
enum Flow {
    Continue,
    Stopped,
}

/// Everything one actor's task owns.
pub(crate) struct ActorTask {
    pub(crate) actor: Box<dyn Actor>,
    pub(crate) mailbox: Mailbox,
    pub(crate) control: mpsc::UnboundedReceiver<Control>,
    pub(crate) context: ActorContext,
    pub(crate) lifecycle: SharedLifecycle,
    pub(crate) strategy: SupervisionStrategy,
    pub(crate) window: RestartWindow,
    pub(crate) factory: Arc<dyn ActorFactory>,
    pub(crate) actor_type: String,
    pub(crate) params: Params,
    pub(crate) group: Option<String>,
    pub(crate) system: SystemRef,
    pub(crate) dead_letters: Arc<DeadLetterSink>,
    pub(crate) events: EventBus,
    pub(crate) watchers: Watchers,
    pub(crate) escalations: mpsc::UnboundedSender<Escalation>,
    pub(crate) throughput: usize,
}

/// Drive one actor until it stops.
///
/// At-most-one concurrent receive holds because this task is the only
/// consumer of the mailbox. Control signals win over deliveries (biased
/// select) so a stop is never starved by a deep queue.
pub(crate) async fn run(mut task: ActorTask) {
    let actor_id = task.context.actor_id().clone();

    task.lifecycle.transition_to(LifecycleState::Starting);
    match task.actor.pre_start(&mut task.context).await {
        Ok(()) => {
            task.lifecycle.transition_to(LifecycleState::Running);
            task.events.publish(PlatformEventKind::ActorStarted {
                actor_id: actor_id.clone(),
            });
        }
        Err(error) => {
            warn!(%actor_id, %error, "pre_start failed");
            if let Flow::Stopped = task.handle_failure(error, None).await {
                task.finalize(&actor_id);
                return;
            }
        }
    }

    loop {
        tokio::select! {
            biased;
            control = task.control.recv() => {
                if let Flow::Stopped = task.handle_control(control).await {
                    break;
                }
            }
            delivery = task.mailbox.recv() => {
                match delivery {
                    Some(delivery) => {
                        if let Flow::Stopped = task.process_burst(delivery).await {
                            break;
                        }
                    }
                    None => {
                        // Every sender dropped: nothing can reach this
                        // actor again.
                        task.shutdown(None).await;
                        break;
                    }
                }
            }
        }
    }

    task.finalize(&actor_id);
}

impl ActorTask {
    /// Process one delivery plus up to `throughput - 1` already-queued
    /// followers, then yield to the scheduler for fairness.
    async fn process_burst(&mut self, first: Delivery) -> Flow {
        let mut processed = 0;
        let mut next = Some(first);

        while let Some(delivery) = next {
            if let Flow::Stopped = self.process(delivery).await {
                return Flow::Stopped;
            }
            processed += 1;
            if processed >= self.throughput || !self.control.is_empty() {
                break;
            }
            next = self.mailbox.try_recv();
        }

        tokio::task::yield_now().await;
        Flow::Continue
    }

    async fn process(&mut self, delivery: Delivery) -> Flow {
        let envelope = delivery.envelope;
        let failing_copy = envelope.clone();
        self.context
            .prepare(delivery.sender, envelope.correlation_id.clone());

        match self.actor.receive(envelope, &mut self.context).await {
            Ok(()) => Flow::Continue,
            Err(error) => self.handle_failure(error, Some(failing_copy)).await,
        }
    }

    /// Translate an uncaught hook error into a supervision directive and
    /// apply it.
    async fn handle_failure(
        &mut self,
        error: ActorError,
        failing: Option<actormesh_core::Envelope>,
    ) -> Flow {
        let actor_id = self.context.actor_id().clone();
        self.lifecycle.record_error(error.to_string());
        self.lifecycle.transition_to(LifecycleState::Failed);
        self.events.publish(PlatformEventKind::ActorFailed {
            actor_id: actor_id.clone(),
            error: error.to_string(),
        });

        let mut directive = self.strategy.decide(&error);
        if directive == Directive::Restart {
            self.window.record_restart();
            if self.window.is_exhausted() {
                warn!(%actor_id, "restart budget exhausted, escalating");
                directive = Directive::Escalate;
            }
        }

        // AllForOne widens the blast radius to the spawn group; the system
        // supervisor applies the directive to the other members.
        if self.strategy.scope() == SupervisorScope::AllForOne && directive != Directive::Escalate {
            if let Some(group) = &self.group {
                let _ = self.escalations.send(Escalation::Group {
                    group: group.clone(),
                    origin: actor_id.clone(),
                    directive,
                    message: error.to_string(),
                });
            }
        }

        match directive {
            Directive::Resume => {
                debug!(%actor_id, "supervision: resume");
                self.lifecycle.transition_to(LifecycleState::Running);
                Flow::Continue
            }
            Directive::Restart => self.perform_restart(&error, failing.as_ref()).await,
            Directive::Stop => {
                self.shutdown(None).await;
                Flow::Stopped
            }
            Directive::Escalate => self.escalate(error).await,
        }
    }

    /// Discard the instance and build a fresh one from the factory. The
    /// mailbox is untouched; the failing envelope is not redelivered.
    async fn perform_restart(
        &mut self,
        cause: &ActorError,
        failing: Option<&actormesh_core::Envelope>,
    ) -> Flow {
        let actor_id = self.context.actor_id().clone();
        self.lifecycle.transition_to(LifecycleState::Restarting);

        if let Err(error) = self
            .actor
            .pre_restart(cause, failing, &mut self.context)
            .await
        {
            warn!(%actor_id, %error, "pre_restart failed");
        }

        match self.factory.create(&self.actor_type, &self.params) {
            Ok(fresh) => {
                self.actor = fresh;
                if let Err(error) = self.actor.post_restart(cause, &mut self.context).await {
                    error!(%actor_id, %error, "post_restart failed, stopping");
                    self.shutdown(None).await;
                    return Flow::Stopped;
                }
                self.lifecycle.transition_to(LifecycleState::Running);
                self.events.publish(PlatformEventKind::ActorRestarted {
                    actor_id,
                    restart_count: self.lifecycle.restart_count(),
                });
                Flow::Continue
            }
            Err(error) => {
                error!(%actor_id, %error, "factory refused replacement instance, stopping");
                self.shutdown(None).await;
                Flow::Stopped
            }
        }
    }

    /// Hand the failure to the service-level handler and wait, Failed, for
    /// its verdict on the control channel. Unhandled escalations come back
    /// as Stop.
    async fn escalate(&mut self, error: ActorError) -> Flow {
        let actor_id = self.context.actor_id().clone();
        let _ = self.escalations.send(Escalation::Upward {
            actor_id,
            kind: error.kind().to_owned(),
            message: error.message().to_owned(),
        });

        match self.control.recv().await {
            Some(Control::Resume) => {
                self.lifecycle.transition_to(LifecycleState::Running);
                Flow::Continue
            }
            Some(Control::Restart { cause, done }) => {
                let flow = self.perform_restart(&cause, None).await;
                if let Some(done) = done {
                    let _ = done.send(matches!(flow, Flow::Continue));
                }
                flow
            }
            Some(Control::Stop { done }) => {
                self.shutdown(done).await;
                Flow::Stopped
            }
            None => {
                self.shutdown(None).await;
                Flow::Stopped
            }
        }
    }

    async fn handle_control(&mut self, control: Option<Control>) -> Flow {
        match control {
            Some(Control::Stop { done }) => {
                self.shutdown(done).await;
                Flow::Stopped
            }
            Some(Control::Restart { cause, done }) => {
                let flow = self.perform_restart(&cause, None).await;
                if let Some(done) = done {
                    let _ = done.send(matches!(flow, Flow::Continue));
                }
                flow
            }
            Some(Control::Resume) => Flow::Continue,
            None => {
                self.shutdown(None).await;
                Flow::Stopped
            }
        }
    }

    /// Cooperative stop: refuse new enqueues, dead-letter the queue, run
    /// post_stop, notify watchers.
    async fn shutdown(&mut self, done: Option<oneshot::Sender<()>>) {
        let actor_id = self.context.actor_id().clone();
        self.lifecycle.transition_to(LifecycleState::Stopping);
        self.mailbox.close();

        while let Some(delivery) = self.mailbox.try_recv() {
            self.dead_letters
                .record(DeadLetterReason::Drained, &actor_id, &delivery.envelope);
        }

        if let Err(error) = self.actor.post_stop(&mut self.context).await {
            warn!(%actor_id, %error, "post_stop failed");
        }

        self.lifecycle.transition_to(LifecycleState::Stopped);
        self.events.publish(PlatformEventKind::ActorStopped {
            actor_id: actor_id.clone(),
        });
        self.watchers.notify(&actor_id);

        // Deregister before acknowledging so a stop caller never observes
        // the stopped actor still in the map.
        self.finalize(&actor_id);
        if let Some(done) = done {
            let _ = done.send(());
        }
    }

    /// Idempotent: shutdown already deregisters; the run loop calls this
    /// again on its way out for paths that never stopped cleanly.
    fn finalize(&self, actor_id: &ActorId) {
        self.system.remove_actor(actor_id);
    }
}
