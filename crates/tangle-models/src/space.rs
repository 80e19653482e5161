//! Space hierarchy state events (`m.space.*`).

use serde::{Deserialize, Serialize};

use crate::registry::EventContent;

/// Declares a child room of a space. All fields optional; an empty content
/// object removes the child relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceChildEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<Vec<String>>,
}

impl EventContent for SpaceChildEvent {
    const EVENT_TYPE: &'static str = "m.space.child";
    const REQUIRED: &'static [&'static str] = &[];
}

/// Declares a parent space of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceParentEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<Vec<String>>,
}

impl EventContent for SpaceParentEvent {
    const EVENT_TYPE: &'static str = "m.space.parent";
    const REQUIRED: &'static [&'static str] = &[];
}
