use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;
use uuid::Uuid;

pub mod events;
pub mod handlers;
pub mod message_types;

use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::models::{Session, UserSummary};
use events::WsOutboundEvent;

/// Why a session was terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    ClientClosed,
    TransportError,
    Superseded,
    IdleTimeout,
}

impl DisconnectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisconnectReason::ClientClosed => "client_closed",
            DisconnectReason::TransportError => "transport_error",
            DisconnectReason::Superseded => "superseded",
            DisconnectReason::IdleTimeout => "idle_timeout",
        }
    }
}

/// All shared mutable state: sessions, the per-user index enforcing the
/// one-session-per-user invariant, and rooms with their history.
#[derive(Default)]
pub(crate) struct HubState {
    /// connection_id -> live session
    pub(crate) sessions: HashMap<Uuid, Session>,
    /// user_id -> connection_id
    pub(crate) by_user: HashMap<Uuid, Uuid>,
    /// room_id -> room
    pub(crate) rooms: HashMap<String, crate::models::Room>,
}

/// Handle to the collaboration state shared by every connection task and the
/// idle sweeper.
///
/// One write lock serializes all mutations, so membership sets and history
/// lists never see lost updates and snapshots are point-in-time consistent.
/// Outbound delivery is a non-blocking send into each connection's own
/// channel; a slow or dead peer never stalls fan-out to others.
#[derive(Default, Clone)]
pub struct CollabHub {
    pub(crate) inner: Arc<RwLock<HubState>>,
}

impl CollabHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an authenticated session for a connection.
    ///
    /// Identity fields arrive pre-verified from the external identity
    /// provider. An existing session for the same user is superseded: its
    /// rooms are left and the old connection is told to shut down.
    pub async fn authenticate(
        &self,
        connection_id: Uuid,
        sender: UnboundedSender<WsOutboundEvent>,
        user_id: Uuid,
        display_name: String,
        avatar_ref: Option<String>,
        role: String,
    ) -> AppResult<()> {
        let mut state = self.inner.write().await;
        if state.sessions.contains_key(&connection_id) {
            return Err(AppError::InvalidEvent(
                "connection is already authenticated".to_string(),
            ));
        }

        if let Some(previous) = state.by_user.get(&user_id).copied() {
            tracing::info!(%user_id, old_connection=%previous, "superseding existing session");
            remove_session(&mut state, previous, DisconnectReason::Superseded);
        }

        let session = Session::new(connection_id, user_id, display_name, avatar_ref, role, sender);
        let user = session.summary();

        for other in state.sessions.values() {
            let _ = other.deliver(WsOutboundEvent::UserConnected { user: user.clone() });
        }

        state.sessions.insert(connection_id, session);
        state.by_user.insert(user_id, connection_id);

        let connected_users: Vec<UserSummary> =
            state.sessions.values().map(|s| s.summary()).collect();
        let active_rooms: Vec<String> = state.rooms.keys().cloned().collect();
        if let Some(session) = state.sessions.get(&connection_id) {
            let _ = session.deliver(WsOutboundEvent::Authenticated {
                connection_id,
                user,
                connected_users,
                active_rooms,
            });
        }

        metrics::set_active_sessions(state.sessions.len() as i64);
        tracing::info!(%user_id, %connection_id, "session authenticated");
        Ok(())
    }

    /// Tear down a connection's session, leaving all its rooms and notifying
    /// the rest of the server. Safe to call for connections that never
    /// authenticated or were already removed.
    pub async fn disconnect(&self, connection_id: Uuid, reason: DisconnectReason) {
        let mut state = self.inner.write().await;
        remove_session(&mut state, connection_id, reason);
    }

    /// Refresh the idle clock and acknowledge.
    pub async fn heartbeat(&self, connection_id: Uuid) -> AppResult<()> {
        let mut state = self.inner.write().await;
        let session = state
            .sessions
            .get_mut(&connection_id)
            .ok_or(AppError::Unauthenticated)?;
        session.touch();
        let _ = session.deliver(WsOutboundEvent::HeartbeatAck {
            timestamp: chrono::Utc::now(),
        });
        Ok(())
    }

    pub async fn session_count(&self) -> usize {
        self.inner.read().await.sessions.len()
    }

    pub async fn room_count(&self) -> usize {
        self.inner.read().await.rooms.len()
    }

    pub async fn connection_for_user(&self, user_id: Uuid) -> Option<Uuid> {
        self.inner.read().await.by_user.get(&user_id).copied()
    }

    pub async fn room_history_len(&self, room_id: &str) -> usize {
        self.inner
            .read()
            .await
            .rooms
            .get(room_id)
            .map(|room| room.history.len())
            .unwrap_or(0)
    }
}

/// Queue an event for one user's live connection, if any. Members without a
/// live connection are silently skipped.
pub(crate) fn deliver_to_user(state: &HubState, user_id: Uuid, event: WsOutboundEvent) {
    if let Some(connection_id) = state.by_user.get(&user_id) {
        if let Some(session) = state.sessions.get(connection_id) {
            if session.deliver(event) {
                metrics::record_delivery();
            }
        }
    }
}

/// Fan an event out to a member list, optionally excluding the acting user.
pub(crate) fn deliver_to_members(
    state: &HubState,
    members: &[Uuid],
    exclude: Option<Uuid>,
    event: &WsOutboundEvent,
) {
    for user_id in members {
        if Some(*user_id) == exclude {
            continue;
        }
        deliver_to_user(state, *user_id, event.clone());
    }
}

/// Remove a user from a room's member set, broadcasting the departure and
/// deleting the room once empty (workspace rooms persist).
pub(crate) fn depart_room(state: &mut HubState, room_id: &str, user_id: Uuid) {
    let Some(room) = state.rooms.get_mut(room_id) else {
        return;
    };
    if !room.members.remove(&user_id) {
        return;
    }
    let remaining: Vec<Uuid> = room.members.iter().copied().collect();
    let delete = remaining.is_empty() && room.kind != crate::models::RoomKind::Workspace;
    if delete {
        state.rooms.remove(room_id);
        tracing::debug!(room_id, "room deleted after last member left");
    }

    let event = WsOutboundEvent::UserLeftRoom {
        room_id: room_id.to_string(),
        user_id,
    };
    for member in remaining {
        deliver_to_user(state, member, event.clone());
    }
}

/// Unwind one session: membership, presence, the per-user index, and the
/// global connected-users view. The eviction paths (supersede, idle sweep)
/// additionally signal the doomed connection so its task shuts down.
pub(crate) fn remove_session(state: &mut HubState, connection_id: Uuid, reason: DisconnectReason) {
    let Some(mut session) = state.sessions.remove(&connection_id) else {
        return;
    };
    if state.by_user.get(&session.user_id) == Some(&connection_id) {
        state.by_user.remove(&session.user_id);
    }

    let rooms: Vec<String> = session.joined_rooms.drain().collect();
    for room_id in &rooms {
        depart_room(state, room_id, session.user_id);
    }

    if matches!(
        reason,
        DisconnectReason::Superseded | DisconnectReason::IdleTimeout
    ) {
        let _ = session.deliver(WsOutboundEvent::SessionEvicted {
            reason: reason.as_str().to_string(),
        });
    }

    let event = WsOutboundEvent::UserDisconnected {
        user_id: session.user_id,
        reason: reason.as_str().to_string(),
    };
    for other in state.sessions.values() {
        let _ = other.deliver(event.clone());
    }

    metrics::record_eviction(reason.as_str());
    metrics::set_active_sessions(state.sessions.len() as i64);
    metrics::set_active_rooms(state.rooms.len() as i64);
    tracing::info!(
        user_id = %session.user_id,
        %connection_id,
        reason = reason.as_str(),
        "session removed"
    );
}
