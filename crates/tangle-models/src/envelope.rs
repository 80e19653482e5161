use serde::{Deserialize, Serialize};

/// The generic transport unit carried over the mesh: a type tag plus the
/// event content it determines.
///
/// Nodes relay envelopes whose tag they do not recognize untouched — the
/// `content` value is kept opaque rather than re-encoded, so unknown event
/// kinds survive a hop through an older node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "type")]
    pub event_type: String,
    pub content: serde_json::Value,
}

impl EventEnvelope {
    pub fn new(event_type: impl Into<String>, content: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            content,
        }
    }
}

/// "Deliver this envelope to every peer subscribed to `topic`."
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishEvent {
    pub topic: String,
    pub message: EventEnvelope,
}

/// "Deliver this envelope to exactly one named peer."
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRequest {
    pub destination: String,
    pub request: EventEnvelope,
}

/// Membership change observed on a topic: `member_id` joined or was seen on
/// `topic`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopicMemberUpdate {
    pub topic: String,
    pub member_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileUpdateType {
    AvatarUrl,
    DisplayName,
}

/// Local profile change fanned out to UI/state consumers. `value: None`
/// clears the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfileUpdate {
    pub update_type: ProfileUpdateType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}
