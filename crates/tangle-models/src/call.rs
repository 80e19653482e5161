//! Call signaling events (`m.call.*`).

use serde::{Deserialize, Serialize};

use crate::registry::EventContent;

/// SDP answer carried inside [`AnswerEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub sdp: String,
    #[serde(rename = "type")]
    pub answer_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEvent {
    pub answer: Answer,
    pub call_id: String,
    pub version: String,
}

impl EventContent for AnswerEvent {
    const EVENT_TYPE: &'static str = "m.call.answer";
    const REQUIRED: &'static [&'static str] =
        &["answer", "answer.sdp", "answer.type", "call_id", "version"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HangupEvent {
    pub call_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub version: String,
}

impl EventContent for HangupEvent {
    const EVENT_TYPE: &'static str = "m.call.hangup";
    const REQUIRED: &'static [&'static str] = &["call_id", "version"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hangup_omits_absent_reason() {
        let event = HangupEvent {
            call_id: "c1".into(),
            reason: None,
            version: "1".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, serde_json::json!({"call_id": "c1", "version": "1"}));
    }

    #[test]
    fn answer_type_uses_wire_name() {
        let event = AnswerEvent {
            answer: Answer {
                sdp: "v=0".into(),
                answer_type: "answer".into(),
            },
            call_id: "c1".into(),
            version: "1".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["answer"]["type"], "answer");
    }
}
