// Layer 1: Standard library imports
use std::any::Any;
use std::collections::HashMap;

// Layer 2: Third-party crate imports
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

// Layer 3: Internal module imports
use crate::envelope::Envelope;

/// Errors raised while reifying an envelope payload.
#[derive(Error, Debug)]
pub enum PayloadError {
    /// The registered decoder rejected the payload JSON
    #[error("payload for tag '{tag}' failed to decode: {source}")]
    Decode {
        tag: String,
        #[source]
        source: serde_json::Error,
    },

    /// The decoded value was not of the requested type
    #[error("payload for tag '{0}' is not of the requested type")]
    TypeMismatch(String),
}

type DecodeFn = Box<dyn Fn(&Value) -> Result<Box<dyn Any + Send>, serde_json::Error> + Send + Sync>;

/// Outcome of decoding an envelope payload.
pub enum DecodedPayload {
    /// The tag was registered; the boxed value is the registered type.
    Typed(Box<dyn Any + Send>),

    /// Unknown tag; the raw JSON is handed through untouched.
    Raw(Value),
}

impl std::fmt::Debug for DecodedPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodedPayload::Typed(_) => f.debug_tuple("Typed").field(&"..").finish(),
            DecodedPayload::Raw(value) => f.debug_tuple("Raw").field(value).finish(),
        }
    }
}

impl DecodedPayload {
    /// Downcast a typed payload to `T`.
    pub fn downcast<T: 'static>(self) -> Option<T> {
        match self {
            DecodedPayload::Typed(boxed) => boxed.downcast::<T>().ok().map(|b| *b),
            DecodedPayload::Raw(_) => None,
        }
    }
}

/// Registry mapping envelope type tags to payload decoders.
///
/// Replaces wire-level class names + reflection with an explicit closed map
/// built at service startup: each hosting service registers the payload
/// types its actors exchange, and receivers reconstruct typed values from
/// the envelope's `type` discriminator. Unregistered tags fall through as
/// raw JSON so actors can still inspect foreign messages.
///
/// # Example
/// ```rust
/// use actormesh_core::{Envelope, PayloadCodec};
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Debug, Deserialize, PartialEq)]
/// struct Ping { n: i64 }
///
/// let mut codec = PayloadCodec::new();
/// codec.register::<Ping>("x.Ping");
///
/// let envelope = Envelope::new("x.Ping", json!({ "n": 42 }));
/// let ping: Ping = codec.decode(&envelope).unwrap().downcast().unwrap();
/// assert_eq!(ping, Ping { n: 42 });
/// ```
#[derive(Default)]
pub struct PayloadCodec {
    decoders: HashMap<String, DecodeFn>,
}

impl PayloadCodec {
    /// Create an empty codec.
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Register a payload type under a tag.
    ///
    /// Later registrations for the same tag replace earlier ones.
    pub fn register<T: DeserializeOwned + Send + 'static>(&mut self, tag: impl Into<String>) {
        self.decoders.insert(
            tag.into(),
            Box::new(|value| {
                let typed: T = serde_json::from_value(value.clone())?;
                Ok(Box::new(typed) as Box<dyn Any + Send>)
            }),
        );
    }

    /// Check whether a tag has a registered decoder.
    pub fn supports(&self, tag: &str) -> bool {
        self.decoders.contains_key(tag)
    }

    /// Decode an envelope's payload according to its type tag.
    pub fn decode(&self, envelope: &Envelope) -> Result<DecodedPayload, PayloadError> {
        match self.decoders.get(&envelope.message_type) {
            Some(decode) => decode(&envelope.payload)
                .map(DecodedPayload::Typed)
                .map_err(|source| PayloadError::Decode {
                    tag: envelope.message_type.clone(),
                    source,
                }),
            None => Ok(DecodedPayload::Raw(envelope.payload.clone())),
        }
    }

    /// Decode an envelope payload directly as `T`.
    ///
    /// Fails with [`PayloadError::TypeMismatch`] when the tag is registered
    /// under a different type, and falls back to a direct deserialization
    /// when the tag is unregistered.
    pub fn decode_as<T: DeserializeOwned + 'static>(
        &self,
        envelope: &Envelope,
    ) -> Result<T, PayloadError> {
        match self.decode(envelope)? {
            DecodedPayload::Typed(boxed) => boxed
                .downcast::<T>()
                .map(|b| *b)
                .map_err(|_| PayloadError::TypeMismatch(envelope.message_type.clone())),
            DecodedPayload::Raw(value) => {
                serde_json::from_value(value).map_err(|source| PayloadError::Decode {
                    tag: envelope.message_type.clone(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Ping {
        n: i64,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Report {
        label: String,
    }

    #[test]
    fn test_registered_tag_decodes_typed() {
        let mut codec = PayloadCodec::new();
        codec.register::<Ping>("x.Ping");

        let envelope = Envelope::new("x.Ping", json!({ "n": 42 }));
        let ping: Ping = codec.decode(&envelope).unwrap().downcast().unwrap();

        assert_eq!(ping, Ping { n: 42 });
    }

    #[test]
    fn test_unknown_tag_falls_back_to_raw() {
        let codec = PayloadCodec::new();
        let envelope = Envelope::new("x.Unknown", json!({ "n": 1 }));

        match codec.decode(&envelope).unwrap() {
            DecodedPayload::Raw(value) => assert_eq!(value, json!({ "n": 1 })),
            DecodedPayload::Typed(_) => panic!("expected raw payload"),
        }
    }

    #[test]
    fn test_malformed_payload_reports_tag() {
        let mut codec = PayloadCodec::new();
        codec.register::<Ping>("x.Ping");

        let envelope = Envelope::new("x.Ping", json!({ "n": "not-a-number" }));
        let err = codec.decode(&envelope).unwrap_err();

        assert!(err.to_string().contains("x.Ping"));
    }

    #[test]
    fn test_decode_as_type_mismatch() {
        let mut codec = PayloadCodec::new();
        codec.register::<Ping>("x.Ping");

        let envelope = Envelope::new("x.Ping", json!({ "n": 42 }));
        let err = codec.decode_as::<Report>(&envelope).unwrap_err();

        assert!(matches!(err, PayloadError::TypeMismatch(_)));
    }

    #[test]
    fn test_decode_as_unregistered_direct() {
        let codec = PayloadCodec::new();
        let envelope = Envelope::new("x.Report", json!({ "label": "ok" }));

        let report: Report = codec.decode_as(&envelope).unwrap();
        assert_eq!(report.label, "ok");
    }

    #[test]
    fn test_reregistration_replaces_decoder() {
        let mut codec = PayloadCodec::new();
        codec.register::<Ping>("tag");
        codec.register::<Report>("tag");

        let envelope = Envelope::new("tag", json!({ "label": "second" }));
        let report: Report = codec.decode_as(&envelope).unwrap();

        assert_eq!(report.label, "second");
    }
}
