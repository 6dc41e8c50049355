//! Supervision: directives, kind-matching strategies, restart windows.

pub mod strategy;
pub mod window;

pub use strategy::{Directive, SupervisionRule, SupervisionStrategy, SupervisorScope};
pub use window::RestartWindow;
