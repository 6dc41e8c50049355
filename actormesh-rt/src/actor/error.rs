// Layer 1: Standard library imports
use std::error::Error;
use std::fmt;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
// (none)

/// Error escaping an actor hook.
///
/// Carries a `kind` discriminator that supervision rules match on, standing
/// in for the exception class a dynamic runtime would dispatch over. Kinds
/// are plain strings chosen by the actor author (`"illegal_state"`,
/// `"io"`, ...); the supervision strategy maps them to directives with
/// ordered first-match rules.
#[derive(Debug)]
pub struct ActorError {
    kind: String,
    message: String,
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl ActorError {
    /// Create an error with a kind and message.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error, keeping it as the source.
    pub fn with_source(
        kind: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind: kind.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// The kind supervision rules match on.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ActorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl Error for ActorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|boxed| boxed.as_ref() as &(dyn Error + 'static))
    }
}
