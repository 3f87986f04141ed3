//! Inbound WebSocket event union.
//!
//! A closed, tagged set of client events validated at the boundary; anything
//! that does not parse into a variant is rejected with an `invalid_event`
//! error frame.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::models::{MessageKind, Presence, RoomKind};

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsInboundEvent {
    /// Identity fields are supplied pre-verified by the external identity
    /// provider fronting this service.
    #[serde(rename = "authenticate")]
    Authenticate {
        user_id: Uuid,
        display_name: String,
        #[serde(default)]
        avatar_ref: Option<String>,
        role: String,
    },

    #[serde(rename = "join_room")]
    JoinRoom {
        room_id: String,
        kind: RoomKind,
        #[serde(default)]
        target_id: Option<Uuid>,
    },

    #[serde(rename = "leave_room")]
    LeaveRoom { room_id: String },

    #[serde(rename = "send_message")]
    SendMessage {
        room_id: String,
        kind: MessageKind,
        content: Value,
        #[serde(default)]
        metadata: Option<Map<String, Value>>,
    },

    #[serde(rename = "typing_start")]
    TypingStart { room_id: String },

    #[serde(rename = "typing_stop")]
    TypingStop { room_id: String },

    #[serde(rename = "cursor_move")]
    CursorMove { room_id: String, x: f64, y: f64 },

    #[serde(rename = "presence_update")]
    PresenceUpdate { presence: Presence },

    #[serde(rename = "approval_action")]
    ApprovalAction {
        request_id: Uuid,
        action: String,
        stage_id: String,
        #[serde(default)]
        comment: Option<String>,
    },

    #[serde(rename = "document_change")]
    DocumentChange {
        room_id: String,
        document_id: Uuid,
        changes: Value,
        version: i64,
    },

    #[serde(rename = "heartbeat")]
    Heartbeat,
}

impl WsInboundEvent {
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Authenticate { .. } => "authenticate",
            Self::JoinRoom { .. } => "join_room",
            Self::LeaveRoom { .. } => "leave_room",
            Self::SendMessage { .. } => "send_message",
            Self::TypingStart { .. } => "typing_start",
            Self::TypingStop { .. } => "typing_stop",
            Self::CursorMove { .. } => "cursor_move",
            Self::PresenceUpdate { .. } => "presence_update",
            Self::ApprovalAction { .. } => "approval_action",
            Self::DocumentChange { .. } => "document_change",
            Self::Heartbeat => "heartbeat",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_room_parses_with_optional_target() {
        let event: WsInboundEvent = serde_json::from_str(
            r#"{"type":"join_room","room_id":"camp-1","kind":"campaign"}"#,
        )
        .unwrap();
        match event {
            WsInboundEvent::JoinRoom {
                room_id,
                kind,
                target_id,
            } => {
                assert_eq!(room_id, "camp-1");
                assert_eq!(kind, RoomKind::Campaign);
                assert!(target_id.is_none());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result = serde_json::from_str::<WsInboundEvent>(r#"{"type":"shapeshift"}"#);
        assert!(result.is_err());
    }
}
