//! Actor handles: local (direct mailbox enqueue) and remote
//! (transport-backed), plus local DeathWatch.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

// Layer 3: Internal module imports
use crate::actor::lifecycle::SharedLifecycle;
use crate::dispatch::Control;
use crate::mailbox::{Delivery, MailboxError, MailboxSender};
use actormesh_core::{
    ActorHealth, ActorId, Envelope, LifecycleState, RemoteAddress, RemoteTransport, ServiceId,
    TellCommand, TransportError,
};

/// Failures sending through an [`ActorRef`].
#[derive(Error, Debug)]
pub enum RefError {
    /// Local enqueue failed (actor stopped)
    #[error(transparent)]
    Mailbox(#[from] MailboxError),

    /// Remote delivery failed
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Token returned by `watch`, used to unwatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchToken(u64);

/// Watcher set for local DeathWatch.
///
/// Watchers receive the terminated actor's id once, during post-stop.
/// Cross-service DeathWatch is out of scope; this is local only.
#[derive(Clone, Default)]
pub(crate) struct Watchers {
    inner: Arc<Mutex<HashMap<u64, mpsc::UnboundedSender<ActorId>>>>,
    next_token: Arc<AtomicU64>,
}

impl Watchers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn watch(&self, watcher: mpsc::UnboundedSender<ActorId>) -> WatchToken {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.inner.lock().insert(token, watcher);
        WatchToken(token)
    }

    pub(crate) fn unwatch(&self, token: WatchToken) {
        self.inner.lock().remove(&token.0);
    }

    pub(crate) fn notify(&self, terminated: &ActorId) {
        let watchers = std::mem::take(&mut *self.inner.lock());
        for (_, watcher) in watchers {
            let _ = watcher.send(terminated.clone());
        }
    }
}

/// Handle to an actor hosted in this process.
///
/// `tell` enqueues directly into the actor's mailbox. Cloning is cheap;
/// every clone addresses the same actor.
#[derive(Clone)]
pub struct LocalActorRef {
    service_id: ServiceId,
    sender: MailboxSender,
    lifecycle: SharedLifecycle,
    control: mpsc::UnboundedSender<Control>,
    watchers: Watchers,
}

impl LocalActorRef {
    pub(crate) fn new(
        service_id: ServiceId,
        sender: MailboxSender,
        lifecycle: SharedLifecycle,
        control: mpsc::UnboundedSender<Control>,
        watchers: Watchers,
    ) -> Self {
        Self {
            service_id,
            sender,
            lifecycle,
            control,
            watchers,
        }
    }

    /// Target actor id.
    pub fn id(&self) -> &ActorId {
        self.sender.actor_id()
    }

    /// Display path of the actor.
    pub fn path(&self) -> String {
        format!("actormesh://{}/{}", self.service_id, self.id())
    }

    /// Enqueue an envelope; FIFO per mailbox, fire-and-forget.
    pub async fn tell(
        &self,
        envelope: Envelope,
        sender: Option<ActorId>,
    ) -> Result<(), MailboxError> {
        let mut delivery = Delivery::new(envelope);
        delivery.sender = sender;
        self.sender.enqueue(delivery).await
    }

    /// Whether the actor is currently RUNNING.
    pub fn is_active(&self) -> bool {
        self.lifecycle.state().is_active()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Current mailbox depth.
    pub fn queue_size(&self) -> u64 {
        self.sender.queue_size()
    }

    /// Ask the actor to stop and wait until it reaches STOPPED.
    ///
    /// The in-flight receive finishes; queued envelopes go to the
    /// dead-letter sink.
    pub async fn stop(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self
            .control
            .send(Control::Stop {
                done: Some(done_tx),
            })
            .is_err()
        {
            // Task already gone: the actor is stopped.
            return;
        }
        let _ = done_rx.await;
    }

    /// Register for DeathWatch: `watcher` receives this actor's id when it
    /// terminates.
    pub fn watch(&self, watcher: mpsc::UnboundedSender<ActorId>) -> WatchToken {
        self.watchers.watch(watcher)
    }

    /// Cancel a DeathWatch registration.
    pub fn unwatch(&self, token: WatchToken) {
        self.watchers.unwatch(token);
    }

    pub(crate) fn control(&self) -> mpsc::UnboundedSender<Control> {
        self.control.clone()
    }
}

/// Handle to an actor hosted elsewhere, backed by a remote transport.
#[derive(Clone)]
pub struct RemoteActorRef {
    address: RemoteAddress,
    transport: Arc<dyn RemoteTransport>,
}

impl RemoteActorRef {
    /// Build a remote ref over an injected transport.
    pub fn new(address: RemoteAddress, transport: Arc<dyn RemoteTransport>) -> Self {
        Self { address, transport }
    }

    /// Target actor id.
    pub fn id(&self) -> &ActorId {
        &self.address.actor_id
    }

    /// Display path of the actor.
    pub fn path(&self) -> String {
        match &self.address.service_url {
            Some(url) => format!("actormesh://{}/{}", url, self.id()),
            None => format!("actormesh://bus/{}", self.id()),
        }
    }

    /// Deliver an envelope through the transport (fire-and-forget).
    pub async fn tell(
        &self,
        envelope: Envelope,
        sender: Option<ActorId>,
    ) -> Result<(), TransportError> {
        let mut command = TellCommand::new(self.address.actor_id.clone(), envelope);
        command.sender_actor_id = sender;
        self.transport.send(&self.address, command).await
    }

    /// Request-reply with a deadline. Not every transport supports this;
    /// the bus transport answers `Unsupported`.
    pub async fn ask(
        &self,
        envelope: Envelope,
        sender: Option<ActorId>,
        timeout: Duration,
    ) -> Result<Envelope, TransportError> {
        let mut command = TellCommand::new(self.address.actor_id.clone(), envelope);
        command.sender_actor_id = sender;
        self.transport.ask(&self.address, command, timeout).await
    }

    /// Whether the remote actor exists.
    pub async fn exists(&self) -> Result<bool, TransportError> {
        self.transport.exists(&self.address).await
    }

    /// Stop the remote actor.
    pub async fn stop(&self) -> Result<(), TransportError> {
        self.transport.stop(&self.address).await
    }

    /// Remote health snapshot.
    pub async fn state(&self) -> Result<ActorHealth, TransportError> {
        self.transport.state(&self.address).await
    }
}

/// Location-transparent actor handle.
#[derive(Clone)]
pub enum ActorRef {
    Local(LocalActorRef),
    Remote(RemoteActorRef),
}

impl ActorRef {
    /// Target actor id.
    pub fn id(&self) -> &ActorId {
        match self {
            ActorRef::Local(local) => local.id(),
            ActorRef::Remote(remote) => remote.id(),
        }
    }

    /// Display path.
    pub fn path(&self) -> String {
        match self {
            ActorRef::Local(local) => local.path(),
            ActorRef::Remote(remote) => remote.path(),
        }
    }

    /// Fire-and-forget send, local or remote.
    pub async fn tell(&self, envelope: Envelope, sender: Option<ActorId>) -> Result<(), RefError> {
        match self {
            ActorRef::Local(local) => local.tell(envelope, sender).await.map_err(RefError::from),
            ActorRef::Remote(remote) => {
                remote.tell(envelope, sender).await.map_err(RefError::from)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_watchers_notify_once_each() {
        let watchers = Watchers::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();

        watchers.watch(tx1);
        watchers.watch(tx2);
        watchers.notify(&ActorId::new("a-1"));

        assert_eq!(rx1.try_recv().unwrap().as_str(), "a-1");
        assert_eq!(rx2.try_recv().unwrap().as_str(), "a-1");
        // Watcher set is consumed by notification.
        assert!(rx1.try_recv().is_err());
    }

    #[test]
    fn test_unwatch_removes_watcher() {
        let watchers = Watchers::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let token = watchers.watch(tx);
        watchers.unwatch(token);
        watchers.notify(&ActorId::new("a-1"));

        assert!(rx.try_recv().is_err());
    }
}
