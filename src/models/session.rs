use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use crate::websocket::events::WsOutboundEvent;

/// Broadcastable availability state of a connected user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Presence {
    #[serde(rename = "online")]
    Online,
    #[serde(rename = "away")]
    Away,
    #[serde(rename = "busy")]
    Busy,
    #[serde(rename = "invisible")]
    Invisible,
}

impl Default for Presence {
    fn default() -> Self {
        Presence::Online
    }
}

impl Presence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Presence::Online => "online",
            Presence::Away => "away",
            Presence::Busy => "busy",
            Presence::Invisible => "invisible",
        }
    }
}

/// Last reported cursor position of a session, scoped to one room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorState {
    pub room_id: String,
    pub x: f64,
    pub y: f64,
}

/// Server-side record of one authenticated connection.
///
/// At most one live session exists per user id; a new authentication for the
/// same user supersedes and evicts the prior session.
#[derive(Debug)]
pub struct Session {
    pub user_id: Uuid,
    pub connection_id: Uuid,
    pub display_name: String,
    pub avatar_ref: Option<String>,
    pub role: String,
    pub connected_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    pub presence: Presence,
    pub joined_rooms: HashSet<String>,
    pub typing_by_room: HashMap<String, bool>,
    pub cursor: Option<CursorState>,
    sender: UnboundedSender<WsOutboundEvent>,
}

impl Session {
    pub fn new(
        connection_id: Uuid,
        user_id: Uuid,
        display_name: String,
        avatar_ref: Option<String>,
        role: String,
        sender: UnboundedSender<WsOutboundEvent>,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            connection_id,
            display_name,
            avatar_ref,
            role,
            connected_at: now,
            last_active_at: now,
            presence: Presence::default(),
            joined_rooms: HashSet::new(),
            typing_by_room: HashMap::new(),
            cursor: None,
            sender,
        }
    }

    /// Refresh the idle clock. Called for every inbound event, heartbeats
    /// included.
    pub fn touch(&mut self) {
        self.last_active_at = Utc::now();
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            user_id: self.user_id,
            display_name: self.display_name.clone(),
            avatar_ref: self.avatar_ref.clone(),
            role: self.role.clone(),
            presence: self.presence,
        }
    }

    /// Queue an event on the connection's outbound channel. Best-effort: a
    /// closed channel means the peer is gone and the event is dropped.
    pub(crate) fn deliver(&self, event: WsOutboundEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}

/// Public view of a connected user, embedded in snapshots and broadcasts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: Uuid,
    pub display_name: String,
    pub avatar_ref: Option<String>,
    pub role: String,
    pub presence: Presence,
}
