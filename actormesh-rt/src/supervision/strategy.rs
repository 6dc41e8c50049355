//! Supervision strategies: ordered error-kind rules mapped to directives.
//!
//! A strategy answers one question: an error of this kind escaped
//! `receive` (or `pre_start`) - what now? Rules are evaluated first-match
//! in registration order, with a mandatory default. The scope widens the
//! blast radius: OneForOne touches the failing actor only, AllForOne
//! applies the directive to every actor spawned in the same group.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::actor::error::ActorError;

/// Default restart budget: restarts allowed inside the sliding window.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default sliding window for the restart budget.
pub const DEFAULT_TIME_RANGE: Duration = Duration::from_secs(60);

/// What the supervisor does with a failing actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Keep the instance and its state; skip the failing envelope.
    Resume,

    /// Discard the instance, build a fresh one from the factory; the
    /// mailbox is preserved and the failing envelope is not redelivered.
    Restart,

    /// Stop the actor: drain to dead letters, run post_stop.
    Stop,

    /// Hand the failure to the service-level handler; unhandled
    /// escalations degrade to Stop.
    Escalate,
}

/// Blast radius of a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorScope {
    /// The directive applies to the failing actor only.
    OneForOne,

    /// The directive applies to every actor in the failing actor's spawn
    /// group. Actors spawned without a group fall back to OneForOne
    /// behavior.
    AllForOne,
}

/// One ordered rule: error kind -> directive.
#[derive(Debug, Clone)]
pub struct SupervisionRule {
    pub kind: String,
    pub directive: Directive,
}

/// Supervision policy attached to an actor at spawn.
///
/// # Example
/// ```rust
/// use actormesh_rt::supervision::{Directive, SupervisionStrategy};
/// use std::time::Duration;
///
/// let strategy = SupervisionStrategy::one_for_one()
///     .with_rule("illegal_state", Directive::Restart)
///     .with_rule("fatal", Directive::Escalate)
///     .with_default(Directive::Stop)
///     .with_restart_budget(5, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct SupervisionStrategy {
    scope: SupervisorScope,
    rules: Vec<SupervisionRule>,
    default_directive: Directive,
    max_retries: u32,
    time_range: Duration,
}

impl SupervisionStrategy {
    /// Strategy scoped to the failing actor only.
    pub fn one_for_one() -> Self {
        Self::with_scope(SupervisorScope::OneForOne)
    }

    /// Strategy applied to the whole spawn group on failure.
    pub fn all_for_one() -> Self {
        Self::with_scope(SupervisorScope::AllForOne)
    }

    fn with_scope(scope: SupervisorScope) -> Self {
        Self {
            scope,
            rules: Vec::new(),
            default_directive: Directive::Stop,
            max_retries: DEFAULT_MAX_RETRIES,
            time_range: DEFAULT_TIME_RANGE,
        }
    }

    /// Append a kind -> directive rule. Rules match first in registration
    /// order.
    pub fn with_rule(mut self, kind: impl Into<String>, directive: Directive) -> Self {
        self.rules.push(SupervisionRule {
            kind: kind.into(),
            directive,
        });
        self
    }

    /// Set the directive for kinds no rule matches.
    pub fn with_default(mut self, directive: Directive) -> Self {
        self.default_directive = directive;
        self
    }

    /// Bound RESTART to `max_retries` within `time_range`; beyond the
    /// budget the failure escalates.
    pub fn with_restart_budget(mut self, max_retries: u32, time_range: Duration) -> Self {
        self.max_retries = max_retries;
        self.time_range = time_range;
        self
    }

    /// Map an error to a directive.
    pub fn decide(&self, error: &ActorError) -> Directive {
        self.rules
            .iter()
            .find(|rule| rule.kind == error.kind())
            .map(|rule| rule.directive)
            .unwrap_or(self.default_directive)
    }

    /// Blast radius.
    pub fn scope(&self) -> SupervisorScope {
        self.scope
    }

    /// Restart budget: allowed restarts inside the window.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Restart budget: sliding window length.
    pub fn time_range(&self) -> Duration {
        self.time_range
    }
}

impl Default for SupervisionStrategy {
    /// OneForOne with no rules: every failure stops the actor. The
    /// conservative default prevents restart storms for unconfigured
    /// actors.
    fn default() -> Self {
        Self::one_for_one()
    }
}
