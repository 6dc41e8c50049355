// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

// Layer 3: Internal module imports
use crate::error::{ErrorCode, Problem};

/// Header carrying the shared secret on protected endpoints.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Shared-secret check applied to every protected HTTP surface.
///
/// An empty configured secret disables the check entirely (dev mode), which
/// is the wire-compatible behavior both the gateway API and the runtime
/// facade rely on.
#[derive(Debug, Clone, Default)]
pub struct SharedSecret {
    secret: Arc<Option<String>>,
}

impl SharedSecret {
    /// Build from configuration; an empty string disables enforcement.
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        Self {
            secret: Arc::new(if secret.is_empty() { None } else { Some(secret) }),
        }
    }

    /// A secret that never enforces (dev mode).
    pub fn disabled() -> Self {
        Self {
            secret: Arc::new(None),
        }
    }

    /// Whether requests without the header will be rejected.
    pub fn is_enforced(&self) -> bool {
        self.secret.is_some()
    }

    /// Check a provided header value.
    pub fn matches(&self, provided: Option<&str>) -> bool {
        match self.secret.as_ref() {
            None => true,
            Some(expected) => provided == Some(expected.as_str()),
        }
    }

    /// The value outbound clients should attach, when enforcement is on.
    pub fn outbound_value(&self) -> Option<&str> {
        self.secret.as_ref().as_deref()
    }
}

/// Axum middleware rejecting requests without the correct `X-API-KEY`.
///
/// Mount on the protected sub-router only; `/health`, `/metrics` and docs
/// stay public.
pub async fn require_api_key(
    State(secret): State<SharedSecret>,
    request: Request,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if secret.matches(provided) {
        next.run(request).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(Problem::new(
                ErrorCode::Unauthorized,
                "missing or invalid API key",
            )),
        )
            .into_response()
    }
}
