//! Tag-to-shape dispatch for protocol events.
//!
//! Every event kind registers a string tag together with the set of field
//! paths that must be present on the wire. Decoding looks the tag up,
//! enforces the required paths, then deserializes; unknown tags are reported
//! as such so relay paths can forward the envelope opaquely instead of
//! rejecting it.

use std::any::Any;
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::envelope::EventEnvelope;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(String),
    #[error("invalid event content: {0}")]
    InvalidContent(String),
    #[error("unknown event type: {0}")]
    UnknownTag(String),
}

/// A typed protocol event content shape.
///
/// `REQUIRED` lists the field paths that must be present and non-null on the
/// wire; a dotted path (`"answer.sdp"`) reaches into a nested object.
/// Optional fields are `Option<T>` and are omitted when absent, never
/// serialized as null.
pub trait EventContent: Serialize + DeserializeOwned + Send + Sync + 'static {
    const EVENT_TYPE: &'static str;
    const REQUIRED: &'static [&'static str];
}

/// Object-safe view of a decoded event, downcastable to its concrete type.
pub trait ProtocolEvent: Any + Send + Sync {
    fn event_type(&self) -> &'static str;
    fn content(&self) -> Value;
    fn as_any(&self) -> &dyn Any;
}

impl std::fmt::Debug for dyn ProtocolEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolEvent")
            .field("event_type", &self.event_type())
            .field("content", &self.content())
            .finish()
    }
}

impl<T: EventContent> ProtocolEvent for T {
    fn event_type(&self) -> &'static str {
        T::EVENT_TYPE
    }

    fn content(&self) -> Value {
        serde_json::to_value(self).expect("event content serializes to JSON")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

type DecodeFn = fn(&Value) -> Result<Box<dyn ProtocolEvent>, ValidationError>;

struct EventCodec {
    required: &'static [&'static str],
    decode: DecodeFn,
}

/// Registry mapping a wire tag to its decode/encode pair.
///
/// Adding an event kind means calling [`EventRegistry::register`] with the
/// new content type; no existing code path changes.
pub struct EventRegistry {
    codecs: HashMap<&'static str, EventCodec>,
}

impl EventRegistry {
    pub fn empty() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// Registry with the full built-in event catalog.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register::<crate::call::AnswerEvent>();
        registry.register::<crate::call::HangupEvent>();
        registry.register::<crate::verification::VerificationRequestEvent>();
        registry.register::<crate::verification::VerificationReadyEvent>();
        registry.register::<crate::verification::VerificationStartEvent>();
        registry.register::<crate::verification::VerificationDoneEvent>();
        registry.register::<crate::verification::VerificationCancelEvent>();
        registry.register::<crate::space::SpaceChildEvent>();
        registry.register::<crate::space::SpaceParentEvent>();
        registry.register::<crate::keys::KeyObject>();
        registry.register::<crate::keys::RoomKeyEvent>();
        registry.register::<crate::keys::RoomKeyRequestEvent>();
        registry
    }

    pub fn register<T: EventContent>(&mut self) {
        self.codecs.insert(
            T::EVENT_TYPE,
            EventCodec {
                required: T::REQUIRED,
                decode: decode_content::<T>,
            },
        );
    }

    pub fn contains(&self, event_type: &str) -> bool {
        self.codecs.contains_key(event_type)
    }

    /// Decode a tagged content value against its registered shape.
    pub fn decode(
        &self,
        event_type: &str,
        content: &Value,
    ) -> Result<Box<dyn ProtocolEvent>, ValidationError> {
        let codec = self
            .codecs
            .get(event_type)
            .ok_or_else(|| ValidationError::UnknownTag(event_type.to_string()))?;
        check_required(content, codec.required)?;
        (codec.decode)(content)
    }

    pub fn decode_envelope(
        &self,
        envelope: &EventEnvelope,
    ) -> Result<Box<dyn ProtocolEvent>, ValidationError> {
        self.decode(&envelope.event_type, &envelope.content)
    }

    /// Decode directly to a concrete content type, bypassing dynamic lookup.
    pub fn decode_as<T: EventContent>(envelope: &EventEnvelope) -> Result<T, ValidationError> {
        if envelope.event_type != T::EVENT_TYPE {
            return Err(ValidationError::UnknownTag(envelope.event_type.clone()));
        }
        check_required(&envelope.content, T::REQUIRED)?;
        serde_json::from_value(envelope.content.clone())
            .map_err(|err| ValidationError::InvalidContent(err.to_string()))
    }

    /// Deterministic inverse of [`EventRegistry::decode`].
    pub fn encode(&self, event: &dyn ProtocolEvent) -> EventEnvelope {
        EventEnvelope {
            event_type: event.event_type().to_string(),
            content: event.content(),
        }
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn decode_content<T: EventContent>(
    content: &Value,
) -> Result<Box<dyn ProtocolEvent>, ValidationError> {
    let event: T = serde_json::from_value(content.clone())
        .map_err(|err| ValidationError::InvalidContent(err.to_string()))?;
    Ok(Box::new(event))
}

/// A required path must resolve to a non-null value. Null on the wire counts
/// as absent.
fn check_required(content: &Value, required: &[&str]) -> Result<(), ValidationError> {
    for path in required {
        let mut current = content;
        for segment in path.split('.') {
            current = match current.get(segment) {
                Some(value) if !value.is_null() => value,
                _ => return Err(ValidationError::MissingField((*path).to_string())),
            };
        }
    }
    Ok(())
}
