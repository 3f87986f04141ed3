use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::models::message::Message;
use crate::models::session::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomKind {
    #[serde(rename = "campaign")]
    Campaign,
    #[serde(rename = "journey")]
    Journey,
    #[serde(rename = "content")]
    Content,
    #[serde(rename = "workspace")]
    Workspace,
    #[serde(rename = "approval")]
    Approval,
}

/// Logical broadcast channel scoping membership and message history to one
/// business context.
///
/// Non-workspace rooms are deleted once their last member leaves; workspace
/// rooms persist regardless of membership.
#[derive(Debug)]
pub struct Room {
    pub room_id: String,
    pub kind: RoomKind,
    pub target_id: Option<Uuid>,
    pub members: HashSet<Uuid>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub metadata: Map<String, Value>,
    pub history: VecDeque<Message>,
}

impl Room {
    /// Per-room history bound. Oldest messages are evicted first.
    pub const HISTORY_CAPACITY: usize = 1000;
    /// Number of history messages included in a join snapshot.
    pub const SNAPSHOT_MESSAGES: usize = 50;

    pub fn new(room_id: String, kind: RoomKind, target_id: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            room_id,
            kind,
            target_id,
            members: HashSet::new(),
            created_at: now,
            last_activity_at: now,
            metadata: Map::new(),
            history: VecDeque::new(),
        }
    }

    pub fn push_history(&mut self, message: Message) {
        if self.history.len() == Self::HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(message);
    }

    /// The most recent messages, oldest first.
    pub fn recent_messages(&self) -> Vec<Message> {
        let skip = self.history.len().saturating_sub(Self::SNAPSHOT_MESSAGES);
        self.history.iter().skip(skip).cloned().collect()
    }
}

/// Point-in-time view of a room handed to a joining client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room_id: String,
    pub kind: RoomKind,
    pub target_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub metadata: Map<String, Value>,
    pub members: Vec<UserSummary>,
    pub messages: Vec<Message>,
}
