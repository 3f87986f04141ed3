use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    #[serde(rename = "chat")]
    Chat,
    #[serde(rename = "notification")]
    Notification,
    #[serde(rename = "system")]
    System,
    #[serde(rename = "approval")]
    Approval,
    #[serde(rename = "collaboration")]
    Collaboration,
}

/// Immutable event record stored in a room's bounded history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: Uuid,
    pub kind: MessageKind,
    pub room_id: String,
    pub sender_id: Uuid,
    pub payload: Value,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Message {
    pub fn new(
        room_id: &str,
        sender_id: Uuid,
        kind: MessageKind,
        payload: Value,
        metadata: Option<Map<String, Value>>,
    ) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            kind,
            room_id: room_id.to_string(),
            sender_id,
            payload,
            timestamp: Utc::now(),
            metadata: metadata.unwrap_or_default(),
        }
    }
}
