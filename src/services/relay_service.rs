//! Relay adapters for the external approval-workflow and document-store
//! engines.
//!
//! Neither operation owns any workflow or document state; both forward the
//! acting user's event to whoever is watching the relevant room. The engines
//! themselves are reached out-of-band by the rest of the platform.

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::websocket::events::WsOutboundEvent;
use crate::websocket::{deliver_to_members, CollabHub};

/// Conventional room id observing one approval request.
pub fn approval_room_id(request_id: Uuid) -> String {
    format!("approval:{request_id}")
}

impl CollabHub {
    /// Broadcast an approval action into `approval:{request_id}`. Relaying
    /// into a room nobody has joined is a silent no-op.
    pub async fn relay_approval_action(
        &self,
        connection_id: Uuid,
        request_id: Uuid,
        action: String,
        stage_id: String,
        comment: Option<String>,
    ) -> AppResult<()> {
        let mut state = self.inner.write().await;
        let session = state
            .sessions
            .get_mut(&connection_id)
            .ok_or(AppError::Unauthenticated)?;
        session.touch();
        let actor_id = session.user_id;
        let actor_name = session.display_name.clone();

        let room_id = approval_room_id(request_id);
        let Some(room) = state.rooms.get(&room_id) else {
            tracing::debug!(%request_id, "no active approval room, relay dropped");
            return Ok(());
        };
        let member_ids: Vec<Uuid> = room.members.iter().copied().collect();

        let event = WsOutboundEvent::ApprovalUpdate {
            request_id,
            action,
            stage_id,
            comment,
            actor_id,
            actor_name,
            timestamp: Utc::now(),
        };
        deliver_to_members(&state, &member_ids, None, &event);
        Ok(())
    }

    /// Relay a document edit to the other members of the room, tagged with
    /// sender identity and the caller-supplied version. No conflict
    /// resolution happens here.
    pub async fn relay_document_change(
        &self,
        connection_id: Uuid,
        room_id: &str,
        document_id: Uuid,
        changes: Value,
        version: i64,
    ) -> AppResult<()> {
        let mut state = self.inner.write().await;
        let session = state
            .sessions
            .get_mut(&connection_id)
            .ok_or(AppError::Unauthenticated)?;
        session.touch();
        if !session.joined_rooms.contains(room_id) {
            return Err(AppError::NotAMember(room_id.to_string()));
        }
        let editor_id = session.user_id;
        let editor_name = session.display_name.clone();

        let member_ids: Vec<Uuid> = state
            .rooms
            .get(room_id)
            .map(|room| room.members.iter().copied().collect())
            .unwrap_or_default();

        let event = WsOutboundEvent::DocumentUpdate {
            room_id: room_id.to_string(),
            document_id,
            changes,
            version,
            editor_id,
            editor_name,
        };
        deliver_to_members(&state, &member_ids, Some(editor_id), &event);
        tracing::debug!(%document_id, room_id, version, "document change relayed");
        Ok(())
    }
}
