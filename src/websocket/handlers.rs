use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::state::AppState;
use crate::websocket::events::WsOutboundEvent;
use crate::websocket::message_types::WsInboundEvent;
use crate::websocket::{CollabHub, DisconnectReason};

pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

/// One task per connection: multiplex the outbound event channel and inbound
/// client frames, then unwind all session state on the way out.
async fn handle_socket(state: AppState, socket: WebSocket) {
    let connection_id = Uuid::new_v4();
    let (tx, mut rx) = unbounded_channel::<WsOutboundEvent>();
    let (mut sender, mut receiver) = socket.split();
    let hub = state.hub.clone();
    let mut reason = DisconnectReason::ClientClosed;

    loop {
        tokio::select! {
            maybe = rx.recv() => {
                let Some(event) = maybe else { break };
                let evicted = matches!(event, WsOutboundEvent::SessionEvicted { .. });
                match event.to_json() {
                    Ok(payload) => {
                        if sender.send(Message::Text(payload)).await.is_err() {
                            reason = DisconnectReason::TransportError;
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(error=%e, %connection_id, "failed to serialize outbound event");
                    }
                }
                if evicted {
                    // Session state is already gone; just close the transport.
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }

            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        handle_client_frame(&hub, connection_id, &tx, &text).await;
                    }
                    Some(Ok(Message::Binary(_))) => {
                        push_error(&tx, &AppError::InvalidEvent(
                            "binary frames are not supported".to_string(),
                        ));
                    }
                    // Ping/pong is handled by the framework
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(error=%e, %connection_id, "websocket read failed");
                        reason = DisconnectReason::TransportError;
                        break;
                    }
                }
            }
        }
    }

    hub.disconnect(connection_id, reason).await;
}

async fn handle_client_frame(
    hub: &CollabHub,
    connection_id: Uuid,
    tx: &UnboundedSender<WsOutboundEvent>,
    text: &str,
) {
    let event = match serde_json::from_str::<WsInboundEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            push_error(tx, &AppError::InvalidEvent(e.to_string()));
            return;
        }
    };

    metrics::record_event(event.kind_label());
    if let Err(err) = dispatch_event(hub, connection_id, tx, event).await {
        push_error(tx, &err);
    }
}

async fn dispatch_event(
    hub: &CollabHub,
    connection_id: Uuid,
    tx: &UnboundedSender<WsOutboundEvent>,
    event: WsInboundEvent,
) -> AppResult<()> {
    match event {
        WsInboundEvent::Authenticate {
            user_id,
            display_name,
            avatar_ref,
            role,
        } => {
            hub.authenticate(connection_id, tx.clone(), user_id, display_name, avatar_ref, role)
                .await
        }
        WsInboundEvent::JoinRoom {
            room_id,
            kind,
            target_id,
        } => hub
            .join_room(connection_id, &room_id, kind, target_id)
            .await
            .map(|_| ()),
        WsInboundEvent::LeaveRoom { room_id } => hub.leave_room(connection_id, &room_id).await,
        WsInboundEvent::SendMessage {
            room_id,
            kind,
            content,
            metadata,
        } => hub
            .send_message(connection_id, &room_id, kind, content, metadata)
            .await
            .map(|_| ()),
        WsInboundEvent::TypingStart { room_id } => {
            hub.set_typing(connection_id, &room_id, true).await
        }
        WsInboundEvent::TypingStop { room_id } => {
            hub.set_typing(connection_id, &room_id, false).await
        }
        WsInboundEvent::CursorMove { room_id, x, y } => {
            hub.move_cursor(connection_id, &room_id, x, y).await
        }
        WsInboundEvent::PresenceUpdate { presence } => {
            hub.set_presence(connection_id, presence).await
        }
        WsInboundEvent::ApprovalAction {
            request_id,
            action,
            stage_id,
            comment,
        } => {
            hub.relay_approval_action(connection_id, request_id, action, stage_id, comment)
                .await
        }
        WsInboundEvent::DocumentChange {
            room_id,
            document_id,
            changes,
            version,
        } => {
            hub.relay_document_change(connection_id, &room_id, document_id, changes, version)
                .await
        }
        WsInboundEvent::Heartbeat => hub.heartbeat(connection_id).await,
    }
}

fn push_error(tx: &UnboundedSender<WsOutboundEvent>, err: &AppError) {
    let _ = tx.send(WsOutboundEvent::from_error(err));
}
