//! Sliding-window restart accounting.
//!
//! Bounds how often supervision may RESTART an actor: restarts older than
//! the window expire, so a burst of failures escalates while occasional
//! failures over a long run do not.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::time::Duration;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

// Layer 3: Internal module imports
// (none)

/// Restart history over a sliding time window.
#[derive(Debug, Clone)]
pub struct RestartWindow {
    max_restarts: u32,
    window: Duration,
    history: VecDeque<DateTime<Utc>>,
}

impl RestartWindow {
    /// Allow `max_restarts` restarts within `window`.
    pub fn new(max_restarts: u32, window: Duration) -> Self {
        Self {
            max_restarts,
            window,
            history: VecDeque::new(),
        }
    }

    /// Record a restart attempt at the current time.
    pub fn record_restart(&mut self) {
        self.expire_old(Utc::now());
        self.history.push_back(Utc::now());
    }

    /// Whether the budget is exhausted.
    pub fn is_exhausted(&mut self) -> bool {
        self.expire_old(Utc::now());
        self.history.len() as u32 > self.max_restarts
    }

    /// Restarts currently counted in the window.
    pub fn current_count(&mut self) -> u32 {
        self.expire_old(Utc::now());
        self.history.len() as u32
    }

    fn expire_old(&mut self, now: DateTime<Utc>) {
        let window =
            chrono::Duration::from_std(self.window).unwrap_or(chrono::Duration::seconds(60));
        while let Some(oldest) = self.history.front() {
            if now.signed_duration_since(*oldest) > window {
                self.history.pop_front();
            } else {
                break;
            }
        }
    }
}
