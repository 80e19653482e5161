//! Transport seam between the event notification bus and the overlay mesh.
//!
//! The real libp2p transport lives outside this workspace; what this crate
//! pins down is the contract it must satisfy — subscribe once to the bus's
//! outbound notifiers, publish topic-membership changes as they are observed,
//! dispatch inbound requests to registered handlers — plus an in-memory mesh
//! that satisfies it for standalone operation and tests.

pub mod handler;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use handler::{RequestHandler, RequestHandlerRegistry};
pub use memory::{MemoryMesh, MeshNode, TopicMessageHandler};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("peer already attached: {0}")]
    AlreadyAttached(String),
    #[error("unknown peer: {0}")]
    UnknownPeer(String),
    #[error("notifier error: {0}")]
    Notifier(#[from] tangle_core::NotifierError),
}

/// Topic membership operations every transport exposes to the node that owns
/// it. Network delivery itself is driven by the bus subscriptions taken at
/// attach time, not through this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    fn peer_id(&self) -> &str;
    async fn join(&self, topic: &str) -> Result<(), TransportError>;
    async fn leave(&self, topic: &str) -> Result<(), TransportError>;
}
