//! Device verification handshake events (`m.key.verification.*`).

use serde::{Deserialize, Serialize};

use crate::registry::EventContent;

/// Reference back to the verification request this step belongs to, used when
/// the handshake runs inside a room rather than over to-device messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRelatesTo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequestEvent {
    pub from_device: String,
    pub methods: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl EventContent for VerificationRequestEvent {
    const EVENT_TYPE: &'static str = "m.key.verification.request";
    const REQUIRED: &'static [&'static str] = &["from_device", "methods"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReadyEvent {
    pub from_device: String,
    #[serde(rename = "m.relates_to", skip_serializing_if = "Option::is_none")]
    pub relates_to: Option<VerificationRelatesTo>,
    pub methods: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl EventContent for VerificationReadyEvent {
    const EVENT_TYPE: &'static str = "m.key.verification.ready";
    const REQUIRED: &'static [&'static str] = &["from_device", "methods"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationStartEvent {
    pub from_device: String,
    #[serde(rename = "m.relates_to", skip_serializing_if = "Option::is_none")]
    pub relates_to: Option<VerificationRelatesTo>,
    pub method: String,
    pub secret: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl EventContent for VerificationStartEvent {
    const EVENT_TYPE: &'static str = "m.key.verification.start";
    const REQUIRED: &'static [&'static str] = &["from_device", "method", "secret"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationDoneEvent {
    #[serde(rename = "m.relates_to", skip_serializing_if = "Option::is_none")]
    pub relates_to: Option<VerificationRelatesTo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl EventContent for VerificationDoneEvent {
    const EVENT_TYPE: &'static str = "m.key.verification.done";
    const REQUIRED: &'static [&'static str] = &[];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCancelEvent {
    pub code: String,
    #[serde(rename = "m.relates_to", skip_serializing_if = "Option::is_none")]
    pub relates_to: Option<VerificationRelatesTo>,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl EventContent for VerificationCancelEvent {
    const EVENT_TYPE: &'static str = "m.key.verification.cancel";
    const REQUIRED: &'static [&'static str] = &["code", "reason"];
}
