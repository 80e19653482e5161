//! Key-management payloads: signed key objects and room key distribution.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::registry::EventContent;

/// A signed key: the key material plus signatures keyed by signing identity
/// and then by key id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyObject {
    pub key: String,
    pub signatures: HashMap<String, HashMap<String, String>>,
}

impl EventContent for KeyObject {
    const EVENT_TYPE: &'static str = "signed_curve25519";
    const REQUIRED: &'static [&'static str] = &["key", "signatures"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomKeyEvent {
    pub algorithm: String,
    pub room_id: String,
    pub session_id: String,
    pub session_key: String,
}

impl EventContent for RoomKeyEvent {
    const EVENT_TYPE: &'static str = "m.room_key";
    const REQUIRED: &'static [&'static str] =
        &["algorithm", "room_id", "session_id", "session_key"];
}

/// Identifies the session a key request refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedKeyInfo {
    pub algorithm: String,
    pub room_id: String,
    pub sender_key: String,
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomKeyRequestEvent {
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestedKeyInfo>,
    pub request_id: String,
    pub requesting_device_id: String,
}

impl EventContent for RoomKeyRequestEvent {
    const EVENT_TYPE: &'static str = "m.room_key_request";
    const REQUIRED: &'static [&'static str] = &["action", "request_id", "requesting_device_id"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{EventRegistry, ValidationError};

    #[test]
    fn key_object_round_trips_signature_map() {
        let mut signatures = HashMap::new();
        signatures.insert(
            "@alice:tangle".to_string(),
            HashMap::from([("ed25519:DEVICE1".to_string(), "sigbytes".to_string())]),
        );
        let key = KeyObject {
            key: "curve-key".into(),
            signatures,
        };
        let envelope = EventRegistry::builtin().encode(&key);
        let decoded: KeyObject = EventRegistry::decode_as(&envelope).unwrap();
        assert_eq!(decoded, key);
    }

    #[test]
    fn key_object_requires_signatures() {
        let err = EventRegistry::builtin()
            .decode("signed_curve25519", &serde_json::json!({"key": "k"}))
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("signatures".into()));
    }

    #[test]
    fn key_request_body_is_optional() {
        let event = RoomKeyRequestEvent {
            action: "request_cancellation".into(),
            body: None,
            request_id: "r1".into(),
            requesting_device_id: "DEVICE1".into(),
        };
        let envelope = EventRegistry::builtin().encode(&event);
        assert!(envelope.content.get("body").is_none());
        let decoded: RoomKeyRequestEvent = EventRegistry::decode_as(&envelope).unwrap();
        assert_eq!(decoded, event);
    }
}
