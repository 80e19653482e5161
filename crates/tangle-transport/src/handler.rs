//! Inbound remote-request dispatch.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tangle_core::CoreError;
use tangle_models::EventEnvelope;

/// Handles one kind of inbound point-to-point request, keyed by the request
/// envelope's type tag.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(
        &self,
        sender: &str,
        request: &EventEnvelope,
    ) -> Result<serde_json::Value, CoreError>;
}

/// Tag-keyed registry of local request handlers. The transport dispatches
/// each inbound request here; a tag with no handler is not an error — the
/// envelope is left for the caller to relay or drop.
#[derive(Default)]
pub struct RequestHandlerRegistry {
    handlers: DashMap<String, Arc<dyn RequestHandler>>,
}

impl RequestHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, event_type: impl Into<String>, handler: Arc<dyn RequestHandler>) {
        self.handlers.insert(event_type.into(), handler);
    }

    pub fn contains(&self, event_type: &str) -> bool {
        self.handlers.contains_key(event_type)
    }

    /// Dispatch an inbound request to its handler. `Ok(None)` means no
    /// handler is registered for the tag.
    pub async fn dispatch(
        &self,
        sender: &str,
        request: &EventEnvelope,
    ) -> Result<Option<serde_json::Value>, CoreError> {
        let handler = match self.handlers.get(&request.event_type) {
            Some(entry) => Arc::clone(entry.value()),
            None => return Ok(None),
        };
        handler.handle(sender, request).await.map(Some)
    }
}
