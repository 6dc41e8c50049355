// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Layer 3: Internal module imports
// (none)

/// Machine-readable error codes carried by every failing API response.
///
/// Callers branch on the code, not the message: `service_unavailable` and
/// `actor_unavailable` are retryable, the rest are not (within one request).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed request or missing required parameters
    Validation,

    /// The hosting service's factory does not support the requested type
    UnknownActorType,

    /// Actor or service id missing from the registry
    NotFound,

    /// The target hosting service is currently flagged down
    ServiceUnavailable,

    /// The actor exists but its hosting service is down
    ActorUnavailable,

    /// A downstream call exceeded its deadline
    Timeout,

    /// Connection refused, protocol or serialization failure downstream
    Transport,

    /// Shared-secret header missing or wrong
    Unauthorized,

    /// Anything else
    Internal,
}

/// Uniform problem body: `{code, message, details?, retryAfterSecs?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub code: ErrorCode,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,

    /// Hint for retryable conditions (seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

impl Problem {
    /// Create a problem body.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            retry_after_secs: None,
        }
    }

    /// Builder method: attach structured details.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Builder method: attach a retry hint.
    pub fn with_retry_after(mut self, secs: u64) -> Self {
        self.retry_after_secs = Some(secs);
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_code_wire_casing() {
        assert_eq!(
            serde_json::to_value(ErrorCode::ActorUnavailable).unwrap(),
            json!("actor_unavailable")
        );
    }

    #[test]
    fn test_problem_minimal_body() {
        let problem = Problem::new(ErrorCode::NotFound, "no such actor");
        let value = serde_json::to_value(&problem).unwrap();

        assert_eq!(value["code"], "not_found");
        assert_eq!(value["message"], "no such actor");
        assert!(value.get("details").is_none());
        assert!(value.get("retryAfterSecs").is_none());
    }

    #[test]
    fn test_problem_with_retry_hint() {
        let problem = Problem::new(ErrorCode::ActorUnavailable, "service down")
            .with_retry_after(10)
            .with_details(json!({ "serviceId": "svc" }));

        let value = serde_json::to_value(&problem).unwrap();
        assert_eq!(value["retryAfterSecs"], 10);
        assert_eq!(value["details"]["serviceId"], "svc");
    }
}
