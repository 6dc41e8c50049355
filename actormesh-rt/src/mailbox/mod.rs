//! Per-actor FIFO mailboxes, their metrics, and the dead-letter sink.

pub mod dead_letter;
pub mod metrics;
pub mod queue;

pub use dead_letter::{DeadLetter, DeadLetterReason, DeadLetterSink};
pub use metrics::MailboxMetrics;
pub use queue::{Delivery, Mailbox, MailboxError, MailboxSender};
