// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use thiserror::Error;
use tokio::sync::mpsc;

// Layer 3: Internal module imports
use super::dead_letter::{DeadLetterReason, DeadLetterSink};
use super::metrics::MailboxMetrics;
use crate::actor::lifecycle::SharedLifecycle;
use actormesh_core::{ActorId, Envelope, LifecycleState};

/// One queued unit of work: an envelope plus who sent it.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub envelope: Envelope,
    pub sender: Option<ActorId>,
}

impl Delivery {
    /// A delivery with no sending actor (external caller).
    pub fn new(envelope: Envelope) -> Self {
        Self {
            envelope,
            sender: None,
        }
    }

    /// Builder method: record the sending actor.
    pub fn with_sender(mut self, sender: ActorId) -> Self {
        self.sender = Some(sender);
        self
    }
}

/// Mailbox enqueue failures.
#[derive(Error, Debug)]
pub enum MailboxError {
    /// The actor is stopping or stopped; the envelope went to dead letters
    #[error("mailbox closed for {0}")]
    Closed(ActorId),
}

enum Tx {
    Bounded(mpsc::Sender<Delivery>),
    Unbounded(mpsc::UnboundedSender<Delivery>),
}

impl Clone for Tx {
    fn clone(&self) -> Self {
        match self {
            Tx::Bounded(tx) => Tx::Bounded(tx.clone()),
            Tx::Unbounded(tx) => Tx::Unbounded(tx.clone()),
        }
    }
}

enum Rx {
    Bounded(mpsc::Receiver<Delivery>),
    Unbounded(mpsc::UnboundedReceiver<Delivery>),
}

/// Receiving half of a mailbox; owned exclusively by the actor's task.
pub struct Mailbox {
    rx: Rx,
    metrics: Arc<MailboxMetrics>,
}

/// Sending half of a mailbox; cheap to clone, shared by every producer.
///
/// An enqueue against a stopping or stopped actor is diverted to the
/// dead-letter sink and reported back as [`MailboxError::Closed`]. A
/// bounded mailbox applies backpressure: `enqueue` suspends until capacity
/// frees up.
#[derive(Clone)]
pub struct MailboxSender {
    tx: Tx,
    actor_id: ActorId,
    lifecycle: SharedLifecycle,
    metrics: Arc<MailboxMetrics>,
    dead_letters: Arc<DeadLetterSink>,
}

impl Mailbox {
    /// Create a mailbox pair.
    ///
    /// `capacity: None` builds the default unbounded FIFO; `Some(n)` builds
    /// a bounded queue with backpressure.
    pub fn channel(
        capacity: Option<usize>,
        actor_id: ActorId,
        lifecycle: SharedLifecycle,
        dead_letters: Arc<DeadLetterSink>,
    ) -> (Mailbox, MailboxSender) {
        let metrics = Arc::new(MailboxMetrics::new());
        let (tx, rx) = match capacity {
            Some(capacity) => {
                let (tx, rx) = mpsc::channel(capacity);
                (Tx::Bounded(tx), Rx::Bounded(rx))
            }
            None => {
                let (tx, rx) = mpsc::unbounded_channel();
                (Tx::Unbounded(tx), Rx::Unbounded(rx))
            }
        };

        let mailbox = Mailbox {
            rx,
            metrics: Arc::clone(&metrics),
        };
        let sender = MailboxSender {
            tx,
            actor_id,
            lifecycle,
            metrics,
            dead_letters,
        };
        (mailbox, sender)
    }

    /// Receive the next delivery, or `None` when every sender is gone.
    pub async fn recv(&mut self) -> Option<Delivery> {
        let delivery = match &mut self.rx {
            Rx::Bounded(rx) => rx.recv().await,
            Rx::Unbounded(rx) => rx.recv().await,
        };
        if delivery.is_some() {
            self.metrics.record_dequeued();
        }
        delivery
    }

    /// Non-blocking receive, used when draining.
    pub fn try_recv(&mut self) -> Option<Delivery> {
        let delivery = match &mut self.rx {
            Rx::Bounded(rx) => rx.try_recv().ok(),
            Rx::Unbounded(rx) => rx.try_recv().ok(),
        };
        if delivery.is_some() {
            self.metrics.record_dequeued();
        }
        delivery
    }

    /// Refuse further enqueues while leaving queued deliveries readable.
    pub fn close(&mut self) {
        match &mut self.rx {
            Rx::Bounded(rx) => rx.close(),
            Rx::Unbounded(rx) => rx.close(),
        }
    }

    /// Discard every queued delivery, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let mut discarded = 0;
        while self.try_recv().is_some() {
            discarded += 1;
        }
        discarded
    }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Shared metrics handle.
    pub fn metrics(&self) -> Arc<MailboxMetrics> {
        Arc::clone(&self.metrics)
    }
}

impl MailboxSender {
    /// Append a delivery to the tail of the queue.
    pub async fn enqueue(&self, delivery: Delivery) -> Result<(), MailboxError> {
        if matches!(
            self.lifecycle.state(),
            LifecycleState::Stopping | LifecycleState::Stopped
        ) {
            self.dead_letters.record(
                DeadLetterReason::Stopped,
                &self.actor_id,
                &delivery.envelope,
            );
            return Err(MailboxError::Closed(self.actor_id.clone()));
        }

        let result = match &self.tx {
            Tx::Bounded(tx) => tx.send(delivery).await.map_err(|e| e.0),
            Tx::Unbounded(tx) => tx.send(delivery).map_err(|e| e.0),
        };

        match result {
            Ok(()) => {
                self.metrics.record_enqueued();
                Ok(())
            }
            Err(delivery) => {
                // Stop race: the receiver closed between the state check
                // and the send.
                self.dead_letters.record(
                    DeadLetterReason::Stopped,
                    &self.actor_id,
                    &delivery.envelope,
                );
                Err(MailboxError::Closed(self.actor_id.clone()))
            }
        }
    }

    /// Target actor of this mailbox.
    pub fn actor_id(&self) -> &ActorId {
        &self.actor_id
    }

    /// Current queue depth.
    pub fn queue_size(&self) -> u64 {
        self.metrics.depth()
    }

    /// Shared metrics handle.
    pub fn metrics(&self) -> Arc<MailboxMetrics> {
        Arc::clone(&self.metrics)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> (Mailbox, MailboxSender, SharedLifecycle, Arc<DeadLetterSink>) {
        let lifecycle = SharedLifecycle::new();
        let dead_letters = Arc::new(DeadLetterSink::new());
        let (mailbox, sender) = Mailbox::channel(
            None,
            ActorId::new("a-1"),
            lifecycle.clone(),
            Arc::clone(&dead_letters),
        );
        (mailbox, sender, lifecycle, dead_letters)
    }

    fn ping(n: i64) -> Envelope {
        Envelope::new("x.Ping", json!({ "n": n }))
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let (mut mailbox, sender, _lifecycle, _dead) = fixture();

        for n in 0..5 {
            sender.enqueue(Delivery::new(ping(n))).await.unwrap();
        }

        for n in 0..5 {
            let delivery = mailbox.recv().await.unwrap();
            assert_eq!(delivery.envelope.payload["n"], n);
        }
    }

    #[tokio::test]
    async fn test_metrics_track_depth() {
        let (mut mailbox, sender, _lifecycle, _dead) = fixture();

        sender.enqueue(Delivery::new(ping(1))).await.unwrap();
        sender.enqueue(Delivery::new(ping(2))).await.unwrap();
        assert_eq!(sender.queue_size(), 2);

        mailbox.recv().await.unwrap();
        assert_eq!(sender.queue_size(), 1);
        assert_eq!(mailbox.metrics().enqueued_count(), 2);
        assert_eq!(mailbox.metrics().dequeued_count(), 1);
    }

    #[tokio::test]
    async fn test_enqueue_after_stop_goes_to_dead_letters() {
        let (_mailbox, sender, lifecycle, dead_letters) = fixture();
        lifecycle.transition_to(LifecycleState::Stopped);

        let err = sender.enqueue(Delivery::new(ping(1))).await;
        assert!(matches!(err, Err(MailboxError::Closed(_))));
        assert_eq!(dead_letters.count(DeadLetterReason::Stopped), 1);
    }

    #[tokio::test]
    async fn test_enqueue_after_receiver_dropped_is_dead_lettered() {
        let (mailbox, sender, _lifecycle, dead_letters) = fixture();
        drop(mailbox);

        let err = sender.enqueue(Delivery::new(ping(1))).await;
        assert!(matches!(err, Err(MailboxError::Closed(_))));
        assert_eq!(dead_letters.count(DeadLetterReason::Stopped), 1);
    }

    #[tokio::test]
    async fn test_close_allows_draining() {
        let (mut mailbox, sender, _lifecycle, _dead) = fixture();
        sender.enqueue(Delivery::new(ping(7))).await.unwrap();

        mailbox.close();
        let drained = mailbox.try_recv().unwrap();
        assert_eq!(drained.envelope.payload["n"], 7);
        assert!(mailbox.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_clear_discards_queue() {
        let (mut mailbox, sender, _lifecycle, _dead) = fixture();
        for n in 0..3 {
            sender.enqueue(Delivery::new(ping(n))).await.unwrap();
        }
        assert!(!mailbox.is_empty());

        assert_eq!(mailbox.clear(), 3);
        assert!(mailbox.is_empty());
        assert!(mailbox.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_bounded_capacity_applies_backpressure() {
        let lifecycle = SharedLifecycle::new();
        let dead_letters = Arc::new(DeadLetterSink::new());
        let (mut mailbox, sender) = Mailbox::channel(
            Some(1),
            ActorId::new("a-1"),
            lifecycle,
            dead_letters,
        );

        sender.enqueue(Delivery::new(ping(1))).await.unwrap();

        // The second enqueue must wait until the first is consumed.
        let pending = tokio::spawn({
            let sender = sender.clone();
            async move { sender.enqueue(Delivery::new(ping(2))).await }
        });

        tokio::task::yield_now().await;
        assert!(!pending.is_finished());

        mailbox.recv().await.unwrap();
        pending.await.unwrap().unwrap();
    }
}
