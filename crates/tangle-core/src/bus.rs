//! The event notification bus: the single seam between protocol logic and
//! the transport collaborator.
//!
//! Application code publishes intents (topic broadcasts, point-to-point
//! requests) here without touching the network. The transport subscribes to
//! the outbound notifiers exactly once at startup and is the only component
//! that performs I/O; it reports mesh membership changes back through the
//! topic-member notifier.

use tangle_models::{
    EventEnvelope, ProfileUpdateType, PublishEvent, RemoteRequest, TopicMemberUpdate,
    UserProfileUpdate,
};

use crate::notifier::{Notifier, NotifierConfig, NotifierError};

#[derive(Clone)]
pub struct EventBus {
    publish_events: Notifier<PublishEvent>,
    remote_requests: Notifier<RemoteRequest>,
    topic_members: Notifier<TopicMemberUpdate>,
    profile_updates: Notifier<UserProfileUpdate>,
}

impl EventBus {
    pub fn new(config: NotifierConfig) -> Self {
        Self {
            publish_events: Notifier::new(config),
            remote_requests: Notifier::new(config),
            topic_members: Notifier::new(config),
            profile_updates: Notifier::new(config),
        }
    }

    /// Outbound topic broadcasts. The transport is the intended subscriber.
    pub fn publish_events(&self) -> &Notifier<PublishEvent> {
        &self.publish_events
    }

    /// Outbound single-destination requests. The transport is the intended
    /// subscriber.
    pub fn remote_requests(&self) -> &Notifier<RemoteRequest> {
        &self.remote_requests
    }

    /// Topic membership changes observed on the mesh, published by the
    /// transport for local consumers.
    pub fn topic_members(&self) -> &Notifier<TopicMemberUpdate> {
        &self.topic_members
    }

    /// Local profile changes fanned out to UI/state consumers.
    pub fn profile_updates(&self) -> &Notifier<UserProfileUpdate> {
        &self.profile_updates
    }

    /// Helper: broadcast an envelope to every peer on `topic`. Nobody
    /// listening (no transport attached) is a no-op, not an error.
    pub async fn publish_to_topic(
        &self,
        topic: impl Into<String>,
        message: EventEnvelope,
    ) -> Result<usize, NotifierError> {
        self.publish_events
            .publish(PublishEvent {
                topic: topic.into(),
                message,
            })
            .await
    }

    /// Helper: send an envelope to exactly one named peer.
    pub async fn send_remote(
        &self,
        destination: impl Into<String>,
        request: EventEnvelope,
    ) -> Result<usize, NotifierError> {
        self.remote_requests
            .publish(RemoteRequest {
                destination: destination.into(),
                request,
            })
            .await
    }

    pub async fn notify_topic_member(
        &self,
        topic: impl Into<String>,
        member_id: impl Into<String>,
    ) -> Result<usize, NotifierError> {
        self.topic_members
            .publish(TopicMemberUpdate {
                topic: topic.into(),
                member_id: member_id.into(),
            })
            .await
    }

    pub async fn notify_profile_update(
        &self,
        update_type: ProfileUpdateType,
        value: Option<String>,
    ) -> Result<usize, NotifierError> {
        self.profile_updates
            .publish(UserProfileUpdate { update_type, value })
            .await
    }

    /// Tear down every notifier. Used on shutdown; subscribers observe end
    /// of stream.
    pub fn close(&self) {
        self.publish_events.close();
        self.remote_requests.close();
        self.topic_members.close();
        self.profile_updates.close();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(NotifierConfig::default())
    }
}
