// Layer 1: Standard library imports
use std::sync::atomic::{AtomicU64, Ordering};

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

// Layer 3: Internal module imports
// (none)

/// Lock-free counters for one mailbox.
///
/// Counters use relaxed atomics; only the last-message timestamp takes a
/// write lock. Shared between the mailbox, its senders, and health
/// snapshots.
#[derive(Debug, Default)]
pub struct MailboxMetrics {
    enqueued: AtomicU64,
    dequeued: AtomicU64,
    depth: AtomicU64,
    last_message_at: RwLock<Option<DateTime<Utc>>>,
}

impl MailboxMetrics {
    /// Create zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful enqueue.
    pub fn record_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
        self.depth.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a dequeue and stamp the last-message timestamp.
    pub fn record_dequeued(&self) {
        self.dequeued.fetch_add(1, Ordering::Relaxed);
        // Saturating: a concurrent clear may already have drained the slot.
        let _ = self
            .depth
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |d| {
                Some(d.saturating_sub(1))
            });
        *self.last_message_at.write() = Some(Utc::now());
    }

    /// Total envelopes ever enqueued.
    pub fn enqueued_count(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    /// Total envelopes ever dequeued.
    pub fn dequeued_count(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }

    /// Current queue depth.
    pub fn depth(&self) -> u64 {
        self.depth.load(Ordering::Relaxed)
    }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.depth() == 0
    }

    /// When the actor last dequeued a message.
    pub fn last_message_at(&self) -> Option<DateTime<Utc>> {
        *self.last_message_at.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_dequeue_counters() {
        let metrics = MailboxMetrics::new();
        metrics.record_enqueued();
        metrics.record_enqueued();
        metrics.record_dequeued();

        assert_eq!(metrics.enqueued_count(), 2);
        assert_eq!(metrics.dequeued_count(), 1);
        assert_eq!(metrics.depth(), 1);
        assert!(!metrics.is_empty());
    }

    #[test]
    fn test_depth_never_underflows() {
        let metrics = MailboxMetrics::new();
        metrics.record_dequeued();

        assert_eq!(metrics.depth(), 0);
    }

    #[test]
    fn test_last_message_timestamp_set_on_dequeue() {
        let metrics = MailboxMetrics::new();
        assert!(metrics.last_message_at().is_none());

        metrics.record_enqueued();
        metrics.record_dequeued();
        assert!(metrics.last_message_at().is_some());
    }
}
