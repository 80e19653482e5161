use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use tangle_core::{CoreError, EventBus};
use tangle_models::registry::{EventRegistry, ProtocolEvent, ValidationError};
use tangle_models::verification::VerificationRequestEvent;
use tangle_models::EventEnvelope;
use tangle_transport::{MemoryMesh, RequestHandler, RequestHandlerRegistry, Transport};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;

/// Acks an inbound device-verification request; forwarding to local devices
/// is the client API layer's job.
struct VerificationRequestHandler;

#[async_trait]
impl RequestHandler for VerificationRequestHandler {
    async fn handle(
        &self,
        sender: &str,
        request: &EventEnvelope,
    ) -> Result<serde_json::Value, CoreError> {
        let event: VerificationRequestEvent = EventRegistry::decode_as(request)?;
        tracing::info!(
            %sender,
            from_device = %event.from_device,
            methods = ?event.methods,
            "verification requested"
        );
        Ok(serde_json::json!({}))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tangle=info")),
        )
        .init();

    let args = cli::Args::parse();
    let mut config = config::Config::load(&args.config)?;
    if let Some(node_name) = args.node_name {
        config.server.node_name = node_name;
    }

    let registry = Arc::new(EventRegistry::builtin());
    let bus = EventBus::new(config.events.notifier_config());
    let handlers = Arc::new(RequestHandlerRegistry::new());
    handlers.register(
        "m.key.verification.request",
        Arc::new(VerificationRequestHandler),
    );

    // Local consumers of the bus: membership and profile changes feed logs
    // here; the client API layer subscribes through the same notifiers.
    let mut members = bus.topic_members().subscribe()?;
    tokio::spawn(async move {
        while let Some(update) = members.recv().await {
            tracing::info!(
                topic = %update.topic,
                member = %update.member_id,
                "topic membership changed"
            );
        }
    });
    let mut profiles = bus.profile_updates().subscribe()?;
    tokio::spawn(async move {
        while let Some(update) = profiles.recv().await {
            tracing::info!(update_type = ?update.update_type, "profile updated");
        }
    });

    // Standalone mode runs a single-node in-memory mesh; a libp2p-backed
    // transport attaches through the same seam.
    let mesh = MemoryMesh::new();
    let decoder = Arc::clone(&registry);
    let node = mesh.attach(
        config.server.node_name.clone(),
        bus.clone(),
        Arc::clone(&handlers),
        Arc::new(move |topic: &str, message: &EventEnvelope| {
            match decoder.decode_envelope(message) {
                Ok(event) => {
                    tracing::debug!(topic, event_type = event.event_type(), "inbound event");
                }
                Err(ValidationError::UnknownTag(tag)) => {
                    tracing::debug!(topic, %tag, "relaying event with unknown type");
                }
                Err(err) => {
                    tracing::warn!(topic, error = %err, "rejected malformed event");
                }
            }
        }),
    )?;
    for topic in &config.server.topics {
        node.join(topic).await?;
    }

    tracing::info!(
        node = %config.server.node_name,
        topics = ?config.server.topics,
        "tangle node running, press ctrl-c to stop"
    );
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    bus.close();
    drop(node);
    Ok(())
}
