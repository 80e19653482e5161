//! In-memory mesh: the loopback transport implementation.
//!
//! One `MemoryMesh` stands in for the overlay network; each homeserver node
//! attaches its event bus and handler registry to it. Attachment subscribes
//! exactly once to the node's outbound notifiers and spawns the forwarding
//! loops, mirroring how the real mesh transport integrates.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tangle_core::EventBus;
use tangle_models::{EventEnvelope, PublishEvent, RemoteRequest};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::handler::RequestHandlerRegistry;
use crate::{Transport, TransportError};

/// Callback invoked for every topic message delivered to a node. Envelopes
/// arrive untouched, so unknown event kinds pass through opaquely.
pub type TopicMessageHandler = Arc<dyn Fn(&str, &EventEnvelope) + Send + Sync>;

struct NodeLink {
    bus: EventBus,
    handlers: Arc<RequestHandlerRegistry>,
    on_topic_message: TopicMessageHandler,
}

struct MeshInner {
    topics: DashMap<String, HashSet<String>>,
    nodes: DashMap<String, NodeLink>,
}

#[derive(Clone)]
pub struct MemoryMesh {
    inner: Arc<MeshInner>,
}

impl MemoryMesh {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MeshInner {
                topics: DashMap::new(),
                nodes: DashMap::new(),
            }),
        }
    }

    /// Current members of a topic. Empty when nobody has joined — publishing
    /// there is a no-op, not an error.
    pub fn members(&self, topic: &str) -> Vec<String> {
        self.inner
            .topics
            .get(topic)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Attach a node to the mesh. Subscribes once to the bus's outbound
    /// notifiers and spawns the forwarding loops; the returned handle detaches
    /// on drop.
    pub fn attach(
        &self,
        peer_id: impl Into<String>,
        bus: EventBus,
        handlers: Arc<RequestHandlerRegistry>,
        on_topic_message: TopicMessageHandler,
    ) -> Result<MeshNode, TransportError> {
        let peer_id = peer_id.into();
        let mut publish_events = bus.publish_events().subscribe()?;
        let mut remote_requests = bus.remote_requests().subscribe()?;
        // Check-and-insert must be atomic: two racing attaches with the same
        // id would otherwise both pass a contains_key check and the loser
        // would overwrite the winner's link.
        match self.inner.nodes.entry(peer_id.clone()) {
            Entry::Occupied(_) => return Err(TransportError::AlreadyAttached(peer_id)),
            Entry::Vacant(slot) => {
                slot.insert(NodeLink {
                    bus,
                    handlers,
                    on_topic_message,
                });
            }
        }

        let inner = Arc::clone(&self.inner);
        let sender = peer_id.clone();
        let publish_loop = tokio::spawn(async move {
            while let Some(event) = publish_events.recv().await {
                deliver_topic_message(&inner, &sender, &event);
            }
        });

        let inner = Arc::clone(&self.inner);
        let sender = peer_id.clone();
        let request_loop = tokio::spawn(async move {
            while let Some(request) = remote_requests.recv().await {
                if let Err(err) = deliver_request(&inner, &sender, &request).await {
                    warn!(%sender, error = %err, "failed to deliver remote request");
                }
            }
        });

        Ok(MeshNode {
            peer_id,
            inner: Arc::clone(&self.inner),
            tasks: vec![publish_loop, request_loop],
        })
    }
}

impl Default for MemoryMesh {
    fn default() -> Self {
        Self::new()
    }
}

fn deliver_topic_message(inner: &MeshInner, sender: &str, event: &PublishEvent) {
    let members = match inner.topics.get(&event.topic) {
        Some(members) => members.clone(),
        None => {
            debug!(topic = %event.topic, "publish to topic with no members, dropping");
            return;
        }
    };
    for member in members {
        if member == sender {
            continue;
        }
        // Clone the callback out of the map entry before invoking it, so a
        // handler that touches the mesh cannot deadlock on the shard lock.
        let callback = inner
            .nodes
            .get(&member)
            .map(|link| Arc::clone(&link.on_topic_message));
        if let Some(callback) = callback {
            callback(&event.topic, &event.message);
        }
    }
}

async fn deliver_request(
    inner: &MeshInner,
    sender: &str,
    request: &RemoteRequest,
) -> Result<(), TransportError> {
    let handlers = inner
        .nodes
        .get(&request.destination)
        .map(|link| Arc::clone(&link.handlers))
        .ok_or_else(|| TransportError::UnknownPeer(request.destination.clone()))?;
    match handlers.dispatch(sender, &request.request).await {
        Ok(Some(_)) => debug!(
            destination = %request.destination,
            event_type = %request.request.event_type,
            "remote request handled"
        ),
        Ok(None) => debug!(
            destination = %request.destination,
            event_type = %request.request.event_type,
            "no handler registered for remote request"
        ),
        Err(err) => warn!(
            destination = %request.destination,
            event_type = %request.request.event_type,
            error = %err,
            "remote request handler failed"
        ),
    }
    Ok(())
}

/// A node's attachment to the mesh. Dropping it stops the forwarding loops
/// and removes the node from every topic.
pub struct MeshNode {
    peer_id: String,
    inner: Arc<MeshInner>,
    tasks: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for MeshNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshNode")
            .field("peer_id", &self.peer_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for MeshNode {
    fn peer_id(&self) -> &str {
        &self.peer_id
    }

    async fn join(&self, topic: &str) -> Result<(), TransportError> {
        self.inner
            .topics
            .entry(topic.to_string())
            .or_default()
            .insert(self.peer_id.clone());
        notify_membership(&self.inner, topic, &self.peer_id).await;
        Ok(())
    }

    async fn leave(&self, topic: &str) -> Result<(), TransportError> {
        if let Some(mut members) = self.inner.topics.get_mut(topic) {
            members.remove(&self.peer_id);
        }
        notify_membership(&self.inner, topic, &self.peer_id).await;
        Ok(())
    }
}

/// Fan a membership-change signal out to every attached node's bus.
async fn notify_membership(inner: &MeshInner, topic: &str, member_id: &str) {
    let buses: Vec<EventBus> = inner
        .nodes
        .iter()
        .map(|entry| entry.value().bus.clone())
        .collect();
    for bus in buses {
        if let Err(err) = bus.notify_topic_member(topic, member_id).await {
            debug!(topic, error = %err, "bus closed during membership notify");
        }
    }
}

impl Drop for MeshNode {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        self.inner.nodes.remove(&self.peer_id);
        for mut members in self.inner.topics.iter_mut() {
            members.remove(&self.peer_id);
        }
    }
}
