pub mod call;
pub mod envelope;
pub mod filter;
pub mod keys;
pub mod registry;
pub mod space;
pub mod verification;

pub use envelope::{
    EventEnvelope, ProfileUpdateType, PublishEvent, RemoteRequest, TopicMemberUpdate,
    UserProfileUpdate,
};
pub use registry::{EventContent, EventRegistry, ProtocolEvent, ValidationError};
