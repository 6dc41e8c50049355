//! The process-local actor system.

// Layer 1: Standard library
use std::sync::{Arc, Weak};
use std::time::Duration;

// Layer 2: Third-party
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

// Layer 3: Internal
use super::ask::AskRegistry;
use super::config::RuntimeConfig;
use super::errors::SystemError;
use crate::actor::context::ActorContext;
use crate::actor::error::ActorError;
use crate::actor::lifecycle::SharedLifecycle;
use crate::dispatch::{self, ActorTask, Control, Escalation};
use crate::factory::{ActorFactory, FactoryError};
use crate::mailbox::{DeadLetterReason, DeadLetterSink, Mailbox, MailboxSender};
use crate::push::{PushRegistry, PushSink};
use crate::refs::{LocalActorRef, Watchers};
use crate::supervision::{Directive, RestartWindow, SupervisionStrategy};
use actormesh_core::{
    ActorHealth, ActorId, CreateCommand, Envelope, EventBus, MessageId, Params, PlatformEventKind,
    ServiceId,
};

/// Service-level escalation handler: `(actor_id, error_kind, message)` to a
/// directive. The default stops the escalated actor.
pub type EscalationHandler = Arc<dyn Fn(&ActorId, &str, &str) -> Directive + Send + Sync>;

/// System state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SystemState {
    Running,
    ShuttingDown,
    Stopped,
}

/// Per-actor bookkeeping owned by the system map.
struct ActorEntry {
    actor_type: String,
    sender: MailboxSender,
    lifecycle: SharedLifecycle,
    control: mpsc::UnboundedSender<Control>,
    watchers: Watchers,
    group: Option<String>,
    spawned_at: DateTime<Utc>,
    task: JoinHandle<()>,
}

pub(crate) struct SystemInner {
    config: RuntimeConfig,
    service_id: ServiceId,
    factory: Arc<dyn ActorFactory>,
    actors: DashMap<ActorId, ActorEntry>,
    dead_letters: Arc<DeadLetterSink>,
    events: EventBus,
    asks: AskRegistry,
    push: PushRegistry,
    escalation_tx: mpsc::UnboundedSender<Escalation>,
    escalation_handler: EscalationHandler,
    state: RwLock<SystemState>,
    supervisor_handle: Mutex<Option<JoinHandle<()>>>,
}

/// Lightweight view of the system handed to actor tasks and contexts.
///
/// Holds a weak reference so tasks never keep a dead system alive.
#[derive(Clone)]
pub(crate) struct SystemRef {
    inner: Weak<SystemInner>,
}

impl SystemRef {
    pub(crate) fn actor_for(&self, actor_id: &ActorId) -> Option<LocalActorRef> {
        let inner = self.inner.upgrade()?;
        let entry = inner.actors.get(actor_id)?;
        Some(local_ref(&inner, &entry))
    }

    pub(crate) fn publish_event(&self, kind: PlatformEventKind) {
        if let Some(inner) = self.inner.upgrade() {
            inner.events.publish(kind);
        }
    }

    pub(crate) fn resolve_ask(&self, correlation_id: &str, reply: Envelope) -> bool {
        match self.inner.upgrade() {
            Some(inner) => inner.asks.resolve(correlation_id, reply),
            None => false,
        }
    }

    pub(crate) fn push_sink(&self, actor_id: &ActorId) -> Option<Arc<dyn PushSink>> {
        self.inner.upgrade()?.push.get(actor_id)
    }

    pub(crate) fn remove_actor(&self, actor_id: &ActorId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.actors.remove(actor_id);
            inner.push.unregister(actor_id);
        }
    }
}

fn local_ref(inner: &Arc<SystemInner>, entry: &ActorEntry) -> LocalActorRef {
    LocalActorRef::new(
        inner.service_id.clone(),
        entry.sender.clone(),
        entry.lifecycle.clone(),
        entry.control.clone(),
        entry.watchers.clone(),
    )
}

/// Spawn parameters.
///
/// # Example
/// ```rust,ignore
/// let request = SpawnRequest::of_type("CapteurActor")
///     .with_id(ActorId::new("capteur-1"))
///     .with_group("capteurs")
///     .with_strategy(SupervisionStrategy::one_for_one());
/// let actor = system.spawn(request).await?;
/// ```
#[derive(Default)]
pub struct SpawnRequest {
    pub actor_type: String,
    pub actor_id: Option<ActorId>,
    pub params: Params,
    pub group: Option<String>,
    pub strategy: Option<SupervisionStrategy>,
    pub mailbox_capacity: Option<usize>,
}

impl SpawnRequest {
    /// Spawn an actor of a factory type with defaults everywhere else.
    pub fn of_type(actor_type: impl Into<String>) -> Self {
        Self {
            actor_type: actor_type.into(),
            ..Self::default()
        }
    }

    /// Builder method: caller-chosen actor id.
    pub fn with_id(mut self, actor_id: ActorId) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    /// Builder method: creation parameters for the factory.
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Builder method: spawn group (the AllForOne child set).
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Builder method: supervision strategy.
    pub fn with_strategy(mut self, strategy: SupervisionStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Builder method: bounded mailbox capacity.
    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = Some(capacity);
        self
    }

    /// Build from a wire create command.
    pub fn from_command(command: CreateCommand) -> Self {
        Self {
            actor_type: command.actor_type,
            actor_id: command.actor_id,
            params: command.params,
            group: None,
            strategy: None,
            mailbox_capacity: None,
        }
    }
}

/// Owner of every actor in one hosting process.
///
/// Spawns through the injected [`ActorFactory`], serializes each actor's
/// execution on its own task, applies supervision, and exposes health.
/// Cloning shares the same system.
#[derive(Clone)]
pub struct ActorSystem {
    inner: Arc<SystemInner>,
}

impl ActorSystem {
    /// Create a system with the default escalation handler (stop).
    pub fn new(
        config: RuntimeConfig,
        service_id: impl Into<ServiceId>,
        factory: impl ActorFactory + 'static,
    ) -> Self {
        Self::with_escalation_handler(config, service_id, factory, Arc::new(|_, _, _| Directive::Stop))
    }

    /// Create a system with a service-level escalation handler.
    pub fn with_escalation_handler(
        config: RuntimeConfig,
        service_id: impl Into<ServiceId>,
        factory: impl ActorFactory + 'static,
        escalation_handler: EscalationHandler,
    ) -> Self {
        let (escalation_tx, escalation_rx) = mpsc::unbounded_channel();

        let inner = Arc::new(SystemInner {
            config,
            service_id: service_id.into(),
            factory: Arc::new(factory),
            actors: DashMap::new(),
            dead_letters: Arc::new(DeadLetterSink::new()),
            events: EventBus::new(),
            asks: AskRegistry::new(),
            push: PushRegistry::new(),
            escalation_tx,
            escalation_handler,
            state: RwLock::new(SystemState::Running),
            supervisor_handle: Mutex::new(None),
        });

        let weak = Arc::downgrade(&inner);
        let handle = tokio::spawn(supervisor_loop(weak, escalation_rx));
        *inner.supervisor_handle.lock() = Some(handle);

        Self { inner }
    }

    /// The service this system runs inside.
    pub fn service_id(&self) -> &ServiceId {
        &self.inner.service_id
    }

    /// Runtime configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// The injected factory.
    pub fn factory(&self) -> Arc<dyn ActorFactory> {
        Arc::clone(&self.inner.factory)
    }

    /// Platform event bus for this process.
    pub fn events(&self) -> EventBus {
        self.inner.events.clone()
    }

    /// Process-local dead-letter sink.
    pub fn dead_letters(&self) -> Arc<DeadLetterSink> {
        Arc::clone(&self.inner.dead_letters)
    }

    /// Push sinks for external observers.
    pub fn push_registry(&self) -> PushRegistry {
        self.inner.push.clone()
    }

    /// Number of live actors.
    pub fn actor_count(&self) -> usize {
        self.inner.actors.len()
    }

    /// Whether a shutdown is in progress or done.
    pub fn is_shutting_down(&self) -> bool {
        *self.inner.state.read() != SystemState::Running
    }

    fn system_ref(&self) -> SystemRef {
        SystemRef {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Instantiate and start an actor.
    ///
    /// The actor is registered immediately; `pre_start` runs on its own
    /// task, so the returned ref may briefly observe CREATED/STARTING.
    pub async fn spawn(&self, request: SpawnRequest) -> Result<LocalActorRef, SystemError> {
        if self.is_shutting_down() {
            return Err(SystemError::ShuttingDown);
        }

        if self.inner.config.max_actors > 0 {
            let current = self.actor_count();
            if current >= self.inner.config.max_actors {
                return Err(SystemError::ActorLimitExceeded {
                    current,
                    max: self.inner.config.max_actors,
                });
            }
        }

        if !self.inner.factory.supports(&request.actor_type) {
            return Err(SystemError::UnknownActorType(request.actor_type));
        }

        let actor_id = request.actor_id.clone().unwrap_or_else(ActorId::generate);
        if self.inner.actors.contains_key(&actor_id) {
            return Err(SystemError::ActorAlreadyExists(actor_id));
        }

        let instance = self
            .inner
            .factory
            .create(&request.actor_type, &request.params)
            .map_err(|error| match error {
                FactoryError::UnknownType(t) => SystemError::UnknownActorType(t),
                FactoryError::Construction { message, .. } => SystemError::SpawnFailed(message),
            })?;

        let lifecycle = SharedLifecycle::new();
        let capacity = request
            .mailbox_capacity
            .or(self.inner.config.mailbox_capacity);
        let (mailbox, sender) = Mailbox::channel(
            capacity,
            actor_id.clone(),
            lifecycle.clone(),
            Arc::clone(&self.inner.dead_letters),
        );
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let watchers = Watchers::new();

        let self_ref = LocalActorRef::new(
            self.inner.service_id.clone(),
            sender.clone(),
            lifecycle.clone(),
            control_tx.clone(),
            watchers.clone(),
        );
        let context = ActorContext::new(self_ref.clone(), self.system_ref());

        let strategy = request.strategy.unwrap_or_default();
        let window = RestartWindow::new(strategy.max_retries(), strategy.time_range());

        let task = ActorTask {
            actor: instance,
            mailbox,
            control: control_rx,
            context,
            lifecycle: lifecycle.clone(),
            strategy,
            window,
            factory: Arc::clone(&self.inner.factory),
            actor_type: request.actor_type.clone(),
            params: request.params,
            group: request.group.clone(),
            system: self.system_ref(),
            dead_letters: Arc::clone(&self.inner.dead_letters),
            events: self.inner.events.clone(),
            watchers: watchers.clone(),
            escalations: self.inner.escalation_tx.clone(),
            throughput: self.inner.config.throughput_per_run.max(1),
        };

        // Hold the task until the map entry exists, so a fast-failing
        // actor cannot finalize before registration.
        let (go_tx, go_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            if go_rx.await.is_ok() {
                dispatch::run(task).await;
            }
        });

        let entry = ActorEntry {
            actor_type: request.actor_type.clone(),
            sender,
            lifecycle,
            control: control_tx,
            watchers,
            group: request.group,
            spawned_at: Utc::now(),
            task: handle,
        };

        match self.inner.actors.entry(actor_id.clone()) {
            Entry::Occupied(_) => {
                entry.task.abort();
                return Err(SystemError::ActorAlreadyExists(actor_id));
            }
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
        }
        let _ = go_tx.send(());

        self.inner.events.publish(PlatformEventKind::ActorCreated {
            actor_id: actor_id.clone(),
            actor_type: request.actor_type,
        });
        debug!(%actor_id, "actor spawned");

        Ok(self_ref)
    }

    /// Ref to a locally hosted actor.
    pub fn get(&self, actor_id: &ActorId) -> Option<LocalActorRef> {
        let entry = self.inner.actors.get(actor_id)?;
        Some(local_ref(&self.inner, &entry))
    }

    /// Whether an actor is hosted here.
    pub fn has(&self, actor_id: &ActorId) -> bool {
        self.inner.actors.contains_key(actor_id)
    }

    /// Ids of every locally hosted actor.
    pub fn all_ids(&self) -> Vec<ActorId> {
        self.inner
            .actors
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Enqueue an envelope for a local actor.
    ///
    /// A missing target is recorded as an undeliverable dead letter.
    pub async fn tell(
        &self,
        target: &ActorId,
        envelope: Envelope,
        sender: Option<ActorId>,
    ) -> Result<(), SystemError> {
        match self.get(target) {
            Some(actor) => {
                actor.tell(envelope, sender).await?;
                Ok(())
            }
            None => {
                self.inner
                    .dead_letters
                    .record(DeadLetterReason::Undeliverable, target, &envelope);
                Err(SystemError::ActorNotFound(target.clone()))
            }
        }
    }

    /// Request-reply against a local actor.
    ///
    /// A correlation id is allocated when the envelope has none; the target
    /// answers through `ActorContext::reply`.
    pub async fn ask(
        &self,
        target: &ActorId,
        mut envelope: Envelope,
        timeout: Duration,
    ) -> Result<Envelope, SystemError> {
        let correlation_id = envelope
            .correlation_id
            .get_or_insert_with(|| MessageId::new().as_str().to_owned())
            .clone();

        let reply_rx = self.inner.asks.register(&correlation_id);
        if let Err(error) = self.tell(target, envelope, None).await {
            self.inner.asks.cancel(&correlation_id);
            return Err(error);
        }

        match tokio::time::timeout(timeout, reply_rx).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(SystemError::AskAbandoned(correlation_id)),
            Err(_) => {
                self.inner.asks.cancel(&correlation_id);
                Err(SystemError::AskTimeout(timeout))
            }
        }
    }

    /// Stop an actor: in-flight receive finishes, the queue is
    /// dead-lettered, `post_stop` runs.
    pub async fn stop(&self, actor_id: &ActorId) -> Result<(), SystemError> {
        let control = match self.inner.actors.get(actor_id) {
            Some(entry) => entry.control.clone(),
            None => return Err(SystemError::ActorNotFound(actor_id.clone())),
        };

        let (done_tx, done_rx) = oneshot::channel();
        if control
            .send(Control::Stop {
                done: Some(done_tx),
            })
            .is_err()
        {
            // Task already finished; treat as stopped.
            return Ok(());
        }

        if tokio::time::timeout(self.inner.config.stop_timeout, done_rx)
            .await
            .is_err()
        {
            warn!(%actor_id, "stop timed out, aborting task");
            if let Some((_, entry)) = self.inner.actors.remove(actor_id) {
                entry.task.abort();
            }
        }
        Ok(())
    }

    /// Administrative restart: replace the instance, preserve the mailbox.
    pub async fn restart(
        &self,
        actor_id: &ActorId,
        reason: impl Into<String>,
    ) -> Result<(), SystemError> {
        let control = match self.inner.actors.get(actor_id) {
            Some(entry) => entry.control.clone(),
            None => return Err(SystemError::ActorNotFound(actor_id.clone())),
        };

        let (done_tx, done_rx) = oneshot::channel();
        let cause = ActorError::new("administrative_restart", reason);
        if control
            .send(Control::Restart {
                cause,
                done: Some(done_tx),
            })
            .is_err()
        {
            return Err(SystemError::ActorNotFound(actor_id.clone()));
        }

        match tokio::time::timeout(self.inner.config.stop_timeout, done_rx).await {
            Ok(Ok(true)) => Ok(()),
            Ok(Ok(false)) | Ok(Err(_)) => Err(SystemError::RestartFailed(actor_id.clone())),
            Err(_) => Err(SystemError::RestartFailed(actor_id.clone())),
        }
    }

    /// Health snapshot of one actor.
    pub fn health(&self, actor_id: &ActorId) -> Result<ActorHealth, SystemError> {
        let entry = self
            .inner
            .actors
            .get(actor_id)
            .ok_or_else(|| SystemError::ActorNotFound(actor_id.clone()))?;

        let snapshot = entry.lifecycle.snapshot();
        let metrics = entry.sender.metrics();
        Ok(ActorHealth {
            state: snapshot.state(),
            last_message_at: metrics.last_message_at(),
            queue_size: metrics.depth(),
            error: snapshot.last_error().map(str::to_owned),
        })
    }

    /// Type string an actor was created from.
    pub fn actor_type(&self, actor_id: &ActorId) -> Option<String> {
        self.inner
            .actors
            .get(actor_id)
            .map(|entry| entry.actor_type.clone())
    }

    /// When an actor was spawned.
    pub fn spawned_at(&self, actor_id: &ActorId) -> Option<DateTime<Utc>> {
        self.inner.actors.get(actor_id).map(|entry| entry.spawned_at)
    }

    /// Stop every actor concurrently; resolves when all reached STOPPED or
    /// the shutdown timeout elapsed.
    pub async fn shutdown(&self) -> Result<(), SystemError> {
        {
            let mut state = self.inner.state.write();
            if *state != SystemState::Running {
                return Err(SystemError::ShuttingDown);
            }
            *state = SystemState::ShuttingDown;
        }
        info!(service_id = %self.inner.service_id, "actor system shutting down");

        let targets: Vec<(ActorId, mpsc::UnboundedSender<Control>)> = self
            .inner
            .actors
            .iter()
            .map(|entry| (entry.key().clone(), entry.control.clone()))
            .collect();

        let mut waits = Vec::with_capacity(targets.len());
        for (_, control) in targets {
            let (done_tx, done_rx) = oneshot::channel();
            if control
                .send(Control::Stop {
                    done: Some(done_tx),
                })
                .is_ok()
            {
                waits.push(done_rx);
            }
        }

        let all_stopped = tokio::time::timeout(self.inner.config.shutdown_timeout, async {
            join_all(waits).await;
        })
        .await;

        if let Some(handle) = self.inner.supervisor_handle.lock().take() {
            handle.abort();
        }

        match all_stopped {
            Ok(()) => {
                *self.inner.state.write() = SystemState::Stopped;
                Ok(())
            }
            Err(_) => {
                for entry in self.inner.actors.iter() {
                    entry.task.abort();
                }
                self.inner.actors.clear();
                *self.inner.state.write() = SystemState::Stopped;
                Err(SystemError::ShutdownTimeout(
                    self.inner.config.shutdown_timeout,
                ))
            }
        }
    }
}

/// System supervisor: fans out AllForOne directives and resolves upward
/// escalations through the service-level handler.
async fn supervisor_loop(
    system: Weak<SystemInner>,
    mut escalations: mpsc::UnboundedReceiver<Escalation>,
) {
    while let Some(escalation) = escalations.recv().await {
        let Some(inner) = system.upgrade() else {
            break;
        };

        match escalation {
            Escalation::Upward {
                actor_id,
                kind,
                message,
            } => {
                let directive = (inner.escalation_handler)(&actor_id, &kind, &message);
                debug!(%actor_id, ?directive, "escalation resolved");
                apply_directive(&inner, &actor_id, directive, &message);
            }
            Escalation::Group {
                group,
                origin,
                directive,
                message,
            } => {
                let members: Vec<(ActorId, mpsc::UnboundedSender<Control>)> = inner
                    .actors
                    .iter()
                    .filter(|entry| {
                        entry.group.as_deref() == Some(group.as_str()) && *entry.key() != origin
                    })
                    .map(|entry| (entry.key().clone(), entry.control.clone()))
                    .collect();

                debug!(group = %group, ?directive, affected = members.len(), "group directive");
                for (actor_id, control) in members {
                    send_directive(&control, &actor_id, directive, &message);
                }
            }
        }
    }
}

fn apply_directive(inner: &Arc<SystemInner>, actor_id: &ActorId, directive: Directive, cause: &str) {
    let control = match inner.actors.get(actor_id) {
        Some(entry) => entry.control.clone(),
        None => return,
    };
    send_directive(&control, actor_id, directive, cause);
}

fn send_directive(
    control: &mpsc::UnboundedSender<Control>,
    actor_id: &ActorId,
    directive: Directive,
    cause: &str,
) {
    let command = match directive {
        Directive::Resume => Control::Resume,
        Directive::Restart => Control::Restart {
            cause: ActorError::new("supervision", cause),
            done: None,
        },
        // An unhandled escalation, or an explicit stop, both stop.
        Directive::Stop | Directive::Escalate => Control::Stop { done: None },
    };
    if control.send(command).is_err() {
        debug!(%actor_id, "directive target already stopped");
    }
}
