//! Message construction, bounded history, and room fan-out.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Message, MessageKind};
use crate::websocket::events::WsOutboundEvent;
use crate::websocket::{deliver_to_members, CollabHub};

impl CollabHub {
    /// Build a message, append it to the room's bounded history, and deliver
    /// it to every member with a live connection. Delivery is best-effort;
    /// a dead peer is skipped without failing the broadcast for others.
    pub async fn send_message(
        &self,
        connection_id: Uuid,
        room_id: &str,
        kind: MessageKind,
        payload: Value,
        metadata: Option<Map<String, Value>>,
    ) -> AppResult<Message> {
        let mut state = self.inner.write().await;
        let session = state
            .sessions
            .get_mut(&connection_id)
            .ok_or(AppError::Unauthenticated)?;
        session.touch();
        let user_id = session.user_id;

        let room = state
            .rooms
            .get_mut(room_id)
            .filter(|room| room.members.contains(&user_id))
            .ok_or_else(|| AppError::NotAMember(room_id.to_string()))?;

        let message = Message::new(room_id, user_id, kind, payload, metadata);
        room.push_history(message.clone());
        room.last_activity_at = message.timestamp;
        let member_ids: Vec<Uuid> = room.members.iter().copied().collect();

        let event = WsOutboundEvent::NewMessage {
            message: message.clone(),
        };
        deliver_to_members(&state, &member_ids, None, &event);
        tracing::debug!(
            message_id = %message.message_id,
            %user_id,
            room_id,
            members = member_ids.len(),
            "message broadcast"
        );
        Ok(message)
    }
}
