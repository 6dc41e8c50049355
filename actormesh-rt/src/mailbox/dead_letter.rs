// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::warn;

// Layer 3: Internal module imports
use actormesh_core::{ActorId, Envelope, MessageId};

/// Default number of dead letters retained for inspection.
pub const DEFAULT_DEAD_LETTER_CAPACITY: usize = 512;

/// Why an envelope could not be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadLetterReason {
    /// Enqueue against a stopped (or stopping) actor
    Stopped,

    /// Queued envelope discarded while the actor was draining to stop
    Drained,

    /// No local actor with the target id
    Undeliverable,
}

/// Diagnostic record of one undeliverable envelope.
///
/// Payloads are not retained; the identifiers are enough to correlate with
/// sender-side logs.
#[derive(Debug, Clone, Serialize)]
pub struct DeadLetter {
    pub reason: DeadLetterReason,
    pub actor_id: ActorId,
    pub message_id: MessageId,
    pub message_type: String,
    pub correlation_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Process-local sink for undeliverable envelopes.
///
/// Keeps a bounded ring of recent entries plus per-reason counters so the
/// sink is observable through metrics without unbounded growth.
#[derive(Debug)]
pub struct DeadLetterSink {
    entries: Mutex<VecDeque<DeadLetter>>,
    capacity: usize,
    stopped: AtomicU64,
    drained: AtomicU64,
    undeliverable: AtomicU64,
}

impl DeadLetterSink {
    /// Create a sink with the default retention capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_DEAD_LETTER_CAPACITY)
    }

    /// Create a sink retaining at most `capacity` recent entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
            capacity,
            stopped: AtomicU64::new(0),
            drained: AtomicU64::new(0),
            undeliverable: AtomicU64::new(0),
        }
    }

    /// Record an undeliverable envelope.
    pub fn record(&self, reason: DeadLetterReason, actor_id: &ActorId, envelope: &Envelope) {
        let letter = DeadLetter {
            reason,
            actor_id: actor_id.clone(),
            message_id: envelope.message_id.clone(),
            message_type: envelope.message_type.clone(),
            correlation_id: envelope.correlation_id.clone(),
            timestamp: Utc::now(),
        };

        warn!(
            actor_id = %letter.actor_id,
            message_id = %letter.message_id,
            reason = ?reason,
            "dead letter"
        );

        match reason {
            DeadLetterReason::Stopped => self.stopped.fetch_add(1, Ordering::Relaxed),
            DeadLetterReason::Drained => self.drained.fetch_add(1, Ordering::Relaxed),
            DeadLetterReason::Undeliverable => self.undeliverable.fetch_add(1, Ordering::Relaxed),
        };

        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(letter);
    }

    /// Count of dead letters for one reason.
    pub fn count(&self, reason: DeadLetterReason) -> u64 {
        match reason {
            DeadLetterReason::Stopped => self.stopped.load(Ordering::Relaxed),
            DeadLetterReason::Drained => self.drained.load(Ordering::Relaxed),
            DeadLetterReason::Undeliverable => self.undeliverable.load(Ordering::Relaxed),
        }
    }

    /// Total dead letters since process start.
    pub fn total(&self) -> u64 {
        self.count(DeadLetterReason::Stopped)
            + self.count(DeadLetterReason::Drained)
            + self.count(DeadLetterReason::Undeliverable)
    }

    /// Snapshot of the retained entries, oldest first.
    pub fn recent(&self) -> Vec<DeadLetter> {
        self.entries.lock().iter().cloned().collect()
    }
}

impl Default for DeadLetterSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope() -> Envelope {
        Envelope::new("x.Ping", json!({ "n": 1 })).with_correlation_id("corr-1")
    }

    #[test]
    fn test_record_increments_reason_counter() {
        let sink = DeadLetterSink::new();
        sink.record(DeadLetterReason::Stopped, &ActorId::new("a-1"), &envelope());
        sink.record(DeadLetterReason::Stopped, &ActorId::new("a-1"), &envelope());
        sink.record(
            DeadLetterReason::Undeliverable,
            &ActorId::new("a-2"),
            &envelope(),
        );

        assert_eq!(sink.count(DeadLetterReason::Stopped), 2);
        assert_eq!(sink.count(DeadLetterReason::Undeliverable), 1);
        assert_eq!(sink.count(DeadLetterReason::Drained), 0);
        assert_eq!(sink.total(), 3);
    }

    #[test]
    fn test_entries_keep_diagnostics() {
        let sink = DeadLetterSink::new();
        sink.record(DeadLetterReason::Drained, &ActorId::new("a-1"), &envelope());

        let recent = sink.recent();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].actor_id.as_str(), "a-1");
        assert_eq!(recent[0].message_type, "x.Ping");
        assert_eq!(recent[0].correlation_id.as_deref(), Some("corr-1"));
    }

    #[test]
    fn test_ring_evicts_oldest() {
        let sink = DeadLetterSink::with_capacity(2);
        for i in 0..3 {
            let id = ActorId::new(format!("a-{i}"));
            sink.record(DeadLetterReason::Stopped, &id, &envelope());
        }

        let recent = sink.recent();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].actor_id.as_str(), "a-1");
        assert_eq!(recent[1].actor_id.as_str(), "a-2");
        // Counters keep the full history.
        assert_eq!(sink.total(), 3);
    }
}
