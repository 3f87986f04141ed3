//! Outbound WebSocket event union.
//!
//! Every frame the server emits is a variant here, serialized exactly once at
//! the socket boundary. The enum is exhaustive; handlers never hand-build
//! JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Message, Presence, RoomSnapshot, UserSummary};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsOutboundEvent {
    // ============================================================
    // Session Events
    // ============================================================
    /// Reply to a successful authenticate, with a snapshot of the server.
    #[serde(rename = "authenticated")]
    Authenticated {
        connection_id: Uuid,
        user: UserSummary,
        connected_users: Vec<UserSummary>,
        active_rooms: Vec<String>,
    },

    #[serde(rename = "user_connected")]
    UserConnected { user: UserSummary },

    #[serde(rename = "user_disconnected")]
    UserDisconnected { user_id: Uuid, reason: String },

    /// Sent to a connection superseded by re-authentication or removed by the
    /// idle sweeper, just before the server closes it.
    #[serde(rename = "session_evicted")]
    SessionEvicted { reason: String },

    // ============================================================
    // Room Events
    // ============================================================
    /// Reply to the joiner, carrying membership and recent history.
    #[serde(rename = "room_joined")]
    RoomJoined { room: RoomSnapshot },

    #[serde(rename = "user_joined_room")]
    UserJoinedRoom { room_id: String, user: UserSummary },

    #[serde(rename = "user_left_room")]
    UserLeftRoom { room_id: String, user_id: Uuid },

    #[serde(rename = "new_message")]
    NewMessage { message: Message },

    // ============================================================
    // Presence Events
    // ============================================================
    #[serde(rename = "presence_update")]
    PresenceUpdate {
        room_id: String,
        user_id: Uuid,
        presence: Presence,
    },

    #[serde(rename = "typing_indicator")]
    TypingIndicator {
        room_id: String,
        user_id: Uuid,
        is_typing: bool,
    },

    #[serde(rename = "cursor_move")]
    CursorMove {
        room_id: String,
        user_id: Uuid,
        x: f64,
        y: f64,
        color: String,
    },

    // ============================================================
    // Relay Events
    // ============================================================
    #[serde(rename = "approval_update")]
    ApprovalUpdate {
        request_id: Uuid,
        action: String,
        stage_id: String,
        comment: Option<String>,
        actor_id: Uuid,
        actor_name: String,
        timestamp: DateTime<Utc>,
    },

    #[serde(rename = "document_update")]
    DocumentUpdate {
        room_id: String,
        document_id: Uuid,
        changes: Value,
        version: i64,
        editor_id: Uuid,
        editor_name: String,
    },

    // ============================================================
    // Control Events
    // ============================================================
    #[serde(rename = "heartbeat_ack")]
    HeartbeatAck { timestamp: DateTime<Utc> },

    #[serde(rename = "error")]
    Error { code: String, message: String },
}

impl WsOutboundEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Authenticated { .. } => "authenticated",
            Self::UserConnected { .. } => "user_connected",
            Self::UserDisconnected { .. } => "user_disconnected",
            Self::SessionEvicted { .. } => "session_evicted",
            Self::RoomJoined { .. } => "room_joined",
            Self::UserJoinedRoom { .. } => "user_joined_room",
            Self::UserLeftRoom { .. } => "user_left_room",
            Self::NewMessage { .. } => "new_message",
            Self::PresenceUpdate { .. } => "presence_update",
            Self::TypingIndicator { .. } => "typing_indicator",
            Self::CursorMove { .. } => "cursor_move",
            Self::ApprovalUpdate { .. } => "approval_update",
            Self::DocumentUpdate { .. } => "document_update",
            Self::HeartbeatAck { .. } => "heartbeat_ack",
            Self::Error { .. } => "error",
        }
    }

    pub fn from_error(err: &AppError) -> Self {
        Self::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
