//! Actor lifecycle tracking.
//!
//! The seven-state machine itself is [`actormesh_core::LifecycleState`];
//! this module tracks transitions, restart counts and the last failure for
//! one actor, and shares that view between the actor's task and everyone
//! holding a local ref.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

// Layer 3: Internal module imports
use actormesh_core::LifecycleState;

/// Lifecycle tracker for a single actor.
///
/// Transitions are monotonic within a run:
///
/// ```text
/// Created -> Starting -> Running -> (Restarting -> Running)* -> Stopping -> Stopped
///                           |
///                           v
///                         Failed   (resolved by supervision)
/// ```
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: LifecycleState,
    last_transition: DateTime<Utc>,
    restart_count: u32,
    last_error: Option<String>,
}

impl Lifecycle {
    /// Create a tracker in the Created state.
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Created,
            last_transition: Utc::now(),
            restart_count: 0,
            last_error: None,
        }
    }

    /// Transition to a new state, recording the timestamp.
    ///
    /// Entering Restarting increments the restart count; entering Running
    /// clears the recorded failure.
    pub fn transition_to(&mut self, new_state: LifecycleState) {
        self.state = new_state;
        self.last_transition = Utc::now();

        match new_state {
            LifecycleState::Restarting => self.restart_count += 1,
            LifecycleState::Running => self.last_error = None,
            _ => {}
        }
    }

    /// Record the failure that drove a transition to Failed.
    pub fn record_error(&mut self, error: impl Into<String>) {
        self.last_error = Some(error.into());
    }

    /// Current state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Timestamp of the last transition.
    pub fn last_transition(&self) -> DateTime<Utc> {
        self.last_transition
    }

    /// Number of restarts performed so far.
    pub fn restart_count(&self) -> u32 {
        self.restart_count
    }

    /// Message of the last uncaught failure, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared, thread-safe view of one actor's lifecycle.
///
/// The actor's own task is the sole writer; refs and health snapshots read.
#[derive(Debug, Clone, Default)]
pub struct SharedLifecycle {
    inner: Arc<RwLock<Lifecycle>>,
}

impl SharedLifecycle {
    /// Create a shared tracker in the Created state.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Lifecycle::new())),
        }
    }

    /// Transition to a new state.
    pub fn transition_to(&self, new_state: LifecycleState) {
        self.inner.write().transition_to(new_state);
    }

    /// Record a failure message.
    pub fn record_error(&self, error: impl Into<String>) {
        self.inner.write().record_error(error);
    }

    /// Current state.
    pub fn state(&self) -> LifecycleState {
        self.inner.read().state()
    }

    /// Current restart count.
    pub fn restart_count(&self) -> u32 {
        self.inner.read().restart_count()
    }

    /// Copy of the full tracker for health snapshots.
    pub fn snapshot(&self) -> Lifecycle {
        self.inner.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_created() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), LifecycleState::Created);
        assert_eq!(lifecycle.restart_count(), 0);
        assert!(lifecycle.last_error().is_none());
    }

    #[test]
    fn test_restarting_increments_count() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.transition_to(LifecycleState::Starting);
        lifecycle.transition_to(LifecycleState::Running);
        lifecycle.transition_to(LifecycleState::Restarting);
        lifecycle.transition_to(LifecycleState::Running);
        lifecycle.transition_to(LifecycleState::Restarting);

        assert_eq!(lifecycle.restart_count(), 2);
    }

    #[test]
    fn test_running_clears_last_error() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.transition_to(LifecycleState::Running);
        lifecycle.record_error("boom");
        lifecycle.transition_to(LifecycleState::Failed);
        assert_eq!(lifecycle.last_error(), Some("boom"));

        lifecycle.transition_to(LifecycleState::Running);
        assert!(lifecycle.last_error().is_none());
    }

    #[test]
    fn test_transition_updates_timestamp() {
        let mut lifecycle = Lifecycle::new();
        let before = lifecycle.last_transition();
        std::thread::sleep(std::time::Duration::from_millis(5));

        lifecycle.transition_to(LifecycleState::Starting);
        assert!(lifecycle.last_transition() > before);
    }

    #[test]
    fn test_shared_view_observes_task_writes() {
        let shared = SharedLifecycle::new();
        let reader = shared.clone();

        shared.transition_to(LifecycleState::Running);
        assert_eq!(reader.state(), LifecycleState::Running);
        assert!(reader.snapshot().last_error().is_none());
    }
}
