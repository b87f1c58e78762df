use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::presence::DisplayCounts;
use crate::room::{ConnectionId, OwnerId, RoomId};
use crate::shared::SessionError;

/// Sender name used for envelopes the server emits on its own behalf
pub const SYSTEM_SENDER: &str = "SYSTEM";

/// Message types for WebSocket communication
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    // Client -> Server, echoed back in broadcasts
    Join,
    Message,
    Ping,

    // Server -> Client
    Leave,
    Error,
}

/// Inbound request from a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default)]
    pub sender_username: String,
    pub sender_connection_id: Option<ConnectionId>,
    pub owner_id: Option<OwnerId>,
    pub room_id: Option<RoomId>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub multi_user: bool,
    pub content: Option<String>,
}

/// A join request that passed validation
#[derive(Debug, Clone)]
pub struct JoinFields {
    pub sender_username: String,
    pub connection_id: ConnectionId,
    pub owner_id: OwnerId,
    pub room_id: RoomId,
    pub categories: Vec<String>,
    pub multi_user: bool,
}

/// A message or ping request that passed validation
#[derive(Debug, Clone)]
pub struct RelayFields {
    pub message_type: MessageType,
    pub sender_username: String,
    pub connection_id: ConnectionId,
    pub room_id: RoomId,
    pub content: String,
}

fn required_id(value: Option<uuid::Uuid>, field: &str) -> Result<uuid::Uuid, SessionError> {
    match value {
        Some(id) if !id.is_nil() => Ok(id),
        Some(_) => Err(SessionError::MalformedRequest(format!("{} must not be nil", field))),
        None => Err(SessionError::MalformedRequest(format!("missing {}", field))),
    }
}

impl SessionRequest {
    fn require_username(&self) -> Result<String, SessionError> {
        let name = self.sender_username.trim();
        if name.is_empty() {
            return Err(SessionError::MalformedRequest(
                "missing sender_username".to_string(),
            ));
        }
        Ok(name.to_string())
    }

    /// Checks the fields a join needs. Event kind is checked by the caller.
    pub fn join_fields(&self) -> Result<JoinFields, SessionError> {
        Ok(JoinFields {
            sender_username: self.require_username()?,
            connection_id: required_id(self.sender_connection_id, "sender_connection_id")?,
            owner_id: required_id(self.owner_id, "owner_id")?,
            room_id: required_id(self.room_id, "room_id")?,
            categories: self.categories.clone(),
            multi_user: self.multi_user,
        })
    }

    /// Checks the fields a message or ping needs
    pub fn relay_fields(&self) -> Result<RelayFields, SessionError> {
        let content = match (self.message_type, &self.content) {
            (_, Some(content)) => content.clone(),
            (MessageType::Ping, None) => String::new(),
            (_, None) => {
                return Err(SessionError::MalformedRequest("missing content".to_string()))
            }
        };

        Ok(RelayFields {
            message_type: self.message_type,
            sender_username: self.require_username()?,
            connection_id: required_id(self.sender_connection_id, "sender_connection_id")?,
            room_id: required_id(self.room_id, "room_id")?,
            content,
        })
    }
}

/// Metadata for outbound envelopes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeMeta {
    pub timestamp: DateTime<Utc>,
}

/// Outbound message, either broadcast to a room topic or returned to a requester
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub content: String,
    pub sender_username: String,
    pub sender_connection_id: Option<ConnectionId>,
    pub room_id: Option<RoomId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_room_count: Option<i64>,
    pub meta: EnvelopeMeta,
}

/// Helper functions for creating envelopes
impl Envelope {
    fn new(message_type: MessageType, content: String, sender_username: String) -> Self {
        Self {
            message_type,
            content,
            sender_username,
            sender_connection_id: None,
            room_id: None,
            room_count: None,
            linked_room_count: None,
            meta: EnvelopeMeta {
                timestamp: Utc::now(),
            },
        }
    }

    fn system(message_type: MessageType, content: String, room_id: RoomId) -> Self {
        Self {
            room_id: Some(room_id),
            ..Self::new(message_type, content, SYSTEM_SENDER.to_string())
        }
    }

    fn with_counts(mut self, counts: DisplayCounts) -> Self {
        self.room_count = Some(counts.room_count);
        self.linked_room_count = counts.linked_room_count;
        self
    }

    /// Announces a new member to a room
    pub fn joined(sender_username: &str, room_id: RoomId, counts: DisplayCounts) -> Self {
        Self::system(
            MessageType::Join,
            format!("User {} has joined the chat", sender_username),
            room_id,
        )
        .with_counts(counts)
    }

    /// Announces a departure from a room
    pub fn left(room_id: RoomId, counts: DisplayCounts) -> Self {
        Self::system(MessageType::Leave, "User has left the chat".to_string(), room_id)
            .with_counts(counts)
    }

    /// Tells a partner room that membership changed in the room linked to it
    pub fn linked_notice(
        message_type: MessageType,
        content: &str,
        source_room_id: RoomId,
        counts: DisplayCounts,
    ) -> Self {
        Self::system(message_type, content.to_string(), source_room_id).with_counts(counts)
    }

    /// Forwards a client message or ping to its room unchanged
    pub fn relay(fields: RelayFields) -> Self {
        Self {
            sender_connection_id: Some(fields.connection_id),
            room_id: Some(fields.room_id),
            ..Self::new(fields.message_type, fields.content, fields.sender_username)
        }
    }

    /// Create an ERROR envelope, only ever returned to the requester
    pub fn error(message: String) -> Self {
        Self::new(MessageType::Error, message, SYSTEM_SENDER.to_string())
    }

    pub fn is_error(&self) -> bool {
        self.message_type == MessageType::Error
    }
}
