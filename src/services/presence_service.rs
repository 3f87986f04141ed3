//! Presence, typing, and cursor propagation.
//!
//! All of this state is transient: it lives on the session, is broadcast on
//! change, and is never persisted beyond the current value.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{CursorState, Presence};
use crate::websocket::events::WsOutboundEvent;
use crate::websocket::{deliver_to_members, CollabHub};

/// Fixed palette for collaborative cursors. The color for a user is derived
/// from their id, so every client renders the same user in the same color.
const CURSOR_PALETTE: [&str; 8] = [
    "#E11D48", "#F97316", "#EAB308", "#22C55E", "#06B6D4", "#3B82F6", "#8B5CF6", "#EC4899",
];

pub fn cursor_color(user_id: Uuid) -> &'static str {
    let digest = Sha256::digest(user_id.as_bytes());
    CURSOR_PALETTE[digest[0] as usize % CURSOR_PALETTE.len()]
}

impl CollabHub {
    /// Update a session's presence and tell every room it belongs to.
    pub async fn set_presence(&self, connection_id: Uuid, presence: Presence) -> AppResult<()> {
        let mut state = self.inner.write().await;
        let session = state
            .sessions
            .get_mut(&connection_id)
            .ok_or(AppError::Unauthenticated)?;
        session.touch();
        session.presence = presence;
        let user_id = session.user_id;
        let rooms: Vec<String> = session.joined_rooms.iter().cloned().collect();

        for room_id in rooms {
            let Some(room) = state.rooms.get(&room_id) else {
                continue;
            };
            let member_ids: Vec<Uuid> = room.members.iter().copied().collect();
            let event = WsOutboundEvent::PresenceUpdate {
                room_id,
                user_id,
                presence,
            };
            deliver_to_members(&state, &member_ids, None, &event);
        }
        tracing::debug!(%user_id, presence = presence.as_str(), "presence updated");
        Ok(())
    }

    /// Flip a typing flag and tell the other members of that room.
    pub async fn set_typing(
        &self,
        connection_id: Uuid,
        room_id: &str,
        is_typing: bool,
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
        session.typing_by_room.insert(room_id.to_string(), is_typing);
        let user_id = session.user_id;

        let member_ids = room_member_ids(&state, room_id);
        let event = WsOutboundEvent::TypingIndicator {
            room_id: room_id.to_string(),
            user_id,
            is_typing,
        };
        deliver_to_members(&state, &member_ids, Some(user_id), &event);
        Ok(())
    }

    /// Store a cursor position and relay it to the other members of the room,
    /// tagged with the user's display color.
    pub async fn move_cursor(
        &self,
        connection_id: Uuid,
        room_id: &str,
        x: f64,
        y: f64,
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
        session.cursor = Some(CursorState {
            room_id: room_id.to_string(),
            x,
            y,
        });
        let user_id = session.user_id;

        let member_ids = room_member_ids(&state, room_id);
        let event = WsOutboundEvent::CursorMove {
            room_id: room_id.to_string(),
            user_id,
            x,
            y,
            color: cursor_color(user_id).to_string(),
        };
        deliver_to_members(&state, &member_ids, Some(user_id), &event);
        Ok(())
    }
}

fn room_member_ids(state: &crate::websocket::HubState, room_id: &str) -> Vec<Uuid> {
    state
        .rooms
        .get(room_id)
        .map(|room| room.members.iter().copied().collect())
        .unwrap_or_default()
}
