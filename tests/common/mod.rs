use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use uuid::Uuid;

use collab_service::websocket::events::WsOutboundEvent;
use collab_service::websocket::CollabHub;

/// A connection registered directly against the hub, bypassing the socket
/// layer. The receiver sees exactly what a live connection would.
pub struct TestClient {
    pub connection_id: Uuid,
    pub user_id: Uuid,
    pub rx: UnboundedReceiver<WsOutboundEvent>,
}

#[allow(dead_code)]
pub async fn connect(hub: &CollabHub, name: &str) -> TestClient {
    connect_as(hub, Uuid::new_v4(), name).await
}

#[allow(dead_code)]
pub async fn connect_as(hub: &CollabHub, user_id: Uuid, name: &str) -> TestClient {
    let (tx, rx) = unbounded_channel();
    let connection_id = Uuid::new_v4();
    hub.authenticate(
        connection_id,
        tx,
        user_id,
        name.to_string(),
        None,
        "editor".to_string(),
    )
    .await
    .expect("authenticate");
    TestClient {
        connection_id,
        user_id,
        rx,
    }
}

/// Pop every event queued so far. Hub operations deliver synchronously, so
/// anything broadcast before this call is already in the channel.
#[allow(dead_code)]
pub fn drain(client: &mut TestClient) -> Vec<WsOutboundEvent> {
    let mut events = Vec::new();
    while let Ok(event) = client.rx.try_recv() {
        events.push(event);
    }
    events
}
