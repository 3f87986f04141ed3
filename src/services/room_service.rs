//! Room membership and lifecycle.
//!
//! Rooms are created lazily on first join and deleted when their last member
//! leaves, except workspace rooms which persist with their history.

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::models::{Room, RoomKind, RoomSnapshot, UserSummary};
use crate::websocket::events::WsOutboundEvent;
use crate::websocket::{deliver_to_members, deliver_to_user, depart_room, CollabHub};

impl CollabHub {
    /// Join a room, creating it if absent. The first join fixes `kind` and
    /// `target_id`; later joins reuse the existing room and are idempotent.
    ///
    /// Existing members are told about the newcomer only on an actual
    /// membership change; the joiner gets a `room_joined` snapshot either way.
    pub async fn join_room(
        &self,
        connection_id: Uuid,
        room_id: &str,
        kind: RoomKind,
        target_id: Option<Uuid>,
    ) -> AppResult<RoomSnapshot> {
        let mut state = self.inner.write().await;
        let session = state
            .sessions
            .get_mut(&connection_id)
            .ok_or(AppError::Unauthenticated)?;
        session.touch();
        let user_id = session.user_id;
        let joiner = session.summary();
        session.joined_rooms.insert(room_id.to_string());

        let room = state
            .rooms
            .entry(room_id.to_string())
            .or_insert_with(|| Room::new(room_id.to_string(), kind, target_id));
        let newly_joined = room.members.insert(user_id);
        let room_kind = room.kind;
        let room_target = room.target_id;
        let created_at = room.created_at;
        let last_activity_at = room.last_activity_at;
        let metadata = room.metadata.clone();
        let messages = room.recent_messages();
        let member_ids: Vec<Uuid> = room.members.iter().copied().collect();

        if newly_joined {
            let event = WsOutboundEvent::UserJoinedRoom {
                room_id: room_id.to_string(),
                user: joiner,
            };
            deliver_to_members(&state, &member_ids, Some(user_id), &event);
            metrics::set_active_rooms(state.rooms.len() as i64);
            tracing::debug!(%user_id, room_id, "user joined room");
        }

        let members: Vec<UserSummary> = member_ids
            .iter()
            .filter_map(|member| state.by_user.get(member))
            .filter_map(|conn| state.sessions.get(conn))
            .map(|s| s.summary())
            .collect();

        let snapshot = RoomSnapshot {
            room_id: room_id.to_string(),
            kind: room_kind,
            target_id: room_target,
            created_at,
            last_activity_at,
            metadata,
            members,
            messages,
        };
        deliver_to_user(
            &state,
            user_id,
            WsOutboundEvent::RoomJoined {
                room: snapshot.clone(),
            },
        );
        Ok(snapshot)
    }

    /// Leave a room, clearing the session's typing flag and cursor for it.
    /// Remaining members see `user_left_room`; an emptied non-workspace room
    /// is deleted along with its history.
    pub async fn leave_room(&self, connection_id: Uuid, room_id: &str) -> AppResult<()> {
        let mut state = self.inner.write().await;
        let session = state
            .sessions
            .get_mut(&connection_id)
            .ok_or(AppError::Unauthenticated)?;
        session.touch();
        if !session.joined_rooms.remove(room_id) {
            return Err(AppError::NotAMember(room_id.to_string()));
        }
        session.typing_by_room.remove(room_id);
        if session
            .cursor
            .as_ref()
            .is_some_and(|cursor| cursor.room_id == room_id)
        {
            session.cursor = None;
        }
        let user_id = session.user_id;

        depart_room(&mut state, room_id, user_id);
        metrics::set_active_rooms(state.rooms.len() as i64);
        tracing::debug!(%user_id, room_id, "user left room");
        Ok(())
    }
}
