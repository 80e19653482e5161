//! End-to-end bus -> mesh -> peer delivery.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tangle_core::{CoreError, EventBus, NotifierConfig};
use tangle_models::call::HangupEvent;
use tangle_models::registry::{EventContent, EventRegistry};
use tangle_models::EventEnvelope;
use tangle_transport::{
    MemoryMesh, MeshNode, RequestHandler, RequestHandlerRegistry, Transport,
};
use tokio::sync::mpsc;
use tokio::time::timeout;

struct TestNode {
    bus: EventBus,
    node: MeshNode,
    inbound: mpsc::UnboundedReceiver<(String, EventEnvelope)>,
    handlers: Arc<RequestHandlerRegistry>,
}

fn attach(mesh: &MemoryMesh, peer_id: &str) -> TestNode {
    let bus = EventBus::new(NotifierConfig::default());
    let handlers = Arc::new(RequestHandlerRegistry::new());
    let (tx, inbound) = mpsc::unbounded_channel();
    let node = mesh
        .attach(
            peer_id,
            bus.clone(),
            Arc::clone(&handlers),
            Arc::new(move |topic: &str, message: &EventEnvelope| {
                let _ = tx.send((topic.to_string(), message.clone()));
            }),
        )
        .expect("attach should succeed");
    TestNode {
        bus,
        node,
        inbound,
        handlers,
    }
}

async fn recv(node: &mut TestNode) -> (String, EventEnvelope) {
    timeout(Duration::from_secs(1), node.inbound.recv())
        .await
        .expect("delivery should not time out")
        .expect("channel should stay open")
}

fn hangup(call_id: &str) -> EventEnvelope {
    EventEnvelope::new(
        HangupEvent::EVENT_TYPE,
        serde_json::json!({"call_id": call_id, "reason": "ice_failed", "version": "1"}),
    )
}

#[tokio::test]
async fn topic_publish_fans_out_to_members_in_order() {
    let mesh = MemoryMesh::new();
    let alpha = attach(&mesh, "alpha");
    let mut beta = attach(&mesh, "beta");
    let mut gamma = attach(&mesh, "gamma");
    let mut delta = attach(&mesh, "delta");

    alpha.node.join("room:1").await.unwrap();
    beta.node.join("room:1").await.unwrap();
    gamma.node.join("room:1").await.unwrap();
    delta.node.join("room:2").await.unwrap();

    alpha.bus.publish_to_topic("room:1", hangup("c1")).await.unwrap();
    alpha.bus.publish_to_topic("room:1", hangup("c2")).await.unwrap();

    for node in [&mut beta, &mut gamma] {
        let (topic, first) = recv(node).await;
        assert_eq!(topic, "room:1");
        assert_eq!(first, hangup("c1"));
        let (_, second) = recv(node).await;
        assert_eq!(second, hangup("c2"));
    }

    // The room:2 member saw nothing.
    assert!(
        timeout(Duration::from_millis(100), delta.inbound.recv())
            .await
            .is_err()
    );
}

#[tokio::test]
async fn publishing_to_an_empty_topic_is_a_silent_noop() {
    let mesh = MemoryMesh::new();
    let alpha = attach(&mesh, "alpha");
    alpha.bus.publish_to_topic("room:empty", hangup("c1")).await.unwrap();
    assert!(mesh.members("room:empty").is_empty());
}

#[tokio::test]
async fn unknown_event_kinds_relay_opaquely() {
    let mesh = MemoryMesh::new();
    let alpha = attach(&mesh, "alpha");
    let mut beta = attach(&mesh, "beta");
    alpha.node.join("room:1").await.unwrap();
    beta.node.join("room:1").await.unwrap();

    let custom = EventEnvelope::new(
        "org.example.custom",
        serde_json::json!({"anything": {"goes": [1, 2, 3]}}),
    );
    alpha.bus.publish_to_topic("room:1", custom.clone()).await.unwrap();

    let (_, received) = recv(&mut beta).await;
    assert_eq!(received, custom);
    // The receiver cannot decode it, but the envelope survived the hop.
    assert!(EventRegistry::builtin().decode_envelope(&received).is_err());
}

#[tokio::test]
async fn remote_request_reaches_exactly_the_named_peer() {
    struct AckHandler(mpsc::UnboundedSender<(String, String)>);

    #[async_trait]
    impl RequestHandler for AckHandler {
        async fn handle(
            &self,
            sender: &str,
            request: &EventEnvelope,
        ) -> Result<serde_json::Value, CoreError> {
            let hangup: HangupEvent = EventRegistry::decode_as(request)?;
            let _ = self.0.send((sender.to_string(), hangup.call_id.clone()));
            Ok(serde_json::json!({}))
        }
    }

    let mesh = MemoryMesh::new();
    let alpha = attach(&mesh, "alpha");
    let beta = attach(&mesh, "beta");
    let gamma = attach(&mesh, "gamma");

    let (beta_tx, mut beta_seen) = mpsc::unbounded_channel();
    let (gamma_tx, mut gamma_seen) = mpsc::unbounded_channel();
    beta.handlers
        .register(HangupEvent::EVENT_TYPE, Arc::new(AckHandler(beta_tx)));
    gamma
        .handlers
        .register(HangupEvent::EVENT_TYPE, Arc::new(AckHandler(gamma_tx)));

    alpha.bus.send_remote("beta", hangup("c9")).await.unwrap();

    let (sender, call_id) = timeout(Duration::from_secs(1), beta_seen.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sender, "alpha");
    assert_eq!(call_id, "c9");
    assert!(
        timeout(Duration::from_millis(100), gamma_seen.recv())
            .await
            .is_err()
    );
}

#[tokio::test]
async fn membership_changes_are_observed_on_every_bus() {
    let mesh = MemoryMesh::new();
    let alpha = attach(&mesh, "alpha");
    let beta = attach(&mesh, "beta");

    let mut alpha_members = alpha.bus.topic_members().subscribe().unwrap();
    beta.node.join("room:1").await.unwrap();

    let update = timeout(Duration::from_secs(1), alpha_members.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(update.topic, "room:1");
    assert_eq!(update.member_id, "beta");
    assert_eq!(mesh.members("room:1"), vec!["beta".to_string()]);

    beta.node.leave("room:1").await.unwrap();
    let update = timeout(Duration::from_secs(1), alpha_members.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(update.member_id, "beta");
    assert!(mesh.members("room:1").is_empty());
}

#[tokio::test]
async fn duplicate_attach_is_rejected_and_leaves_first_node_intact() {
    let mesh = MemoryMesh::new();
    let alpha = attach(&mesh, "alpha");
    let mut beta = attach(&mesh, "beta");
    alpha.node.join("room:1").await.unwrap();
    beta.node.join("room:1").await.unwrap();

    let impostor_bus = EventBus::new(NotifierConfig::default());
    let err = mesh
        .attach(
            "beta",
            impostor_bus,
            Arc::new(RequestHandlerRegistry::new()),
            Arc::new(|_: &str, _: &EventEnvelope| {}),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        tangle_transport::TransportError::AlreadyAttached(ref id) if id == "beta"
    ));

    // The original beta link still forwards.
    alpha.bus.publish_to_topic("room:1", hangup("c1")).await.unwrap();
    let (_, received) = recv(&mut beta).await;
    assert_eq!(received, hangup("c1"));
}

#[tokio::test]
async fn detached_node_stops_receiving() {
    let mesh = MemoryMesh::new();
    let alpha = attach(&mesh, "alpha");
    let mut beta = attach(&mesh, "beta");
    alpha.node.join("room:1").await.unwrap();
    beta.node.join("room:1").await.unwrap();

    drop(beta.node);
    alpha.bus.publish_to_topic("room:1", hangup("c1")).await.unwrap();
    // Either nothing arrives, or the inbound channel closed on detach.
    match timeout(Duration::from_millis(100), beta.inbound.recv()).await {
        Ok(Some(message)) => panic!("detached node received {message:?}"),
        Ok(None) | Err(_) => {}
    }
    assert!(mesh.members("room:1").contains(&"alpha".to_string()));
    assert!(!mesh.members("room:1").contains(&"beta".to_string()));
}
