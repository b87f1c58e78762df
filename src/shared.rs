use std::ops::RangeInclusive;
use std::sync::Arc;
use thiserror::Error;

use crate::event::EventBus;
use crate::room::RoomId;
use crate::websockets::coordinator::SessionCoordinator;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<SessionCoordinator>,
    pub event_bus: EventBus,
}

impl AppState {
    pub fn new(coordinator: Arc<SessionCoordinator>, event_bus: EventBus) -> Self {
        Self {
            coordinator,
            event_bus,
        }
    }
}

/// Reasons a session event was rejected. All of them end up as an error
/// envelope returned to the requester.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Invalid input: {0}")]
    MalformedRequest(String),

    #[error("Connection is already a member of room {0}")]
    AlreadyMember(RoomId),

    #[error("Session is already linked to room {0}")]
    SessionAlreadyLinked(RoomId),

    #[error("Room {0} does not accept this room type")]
    TypeMismatch(RoomId),

    #[error("Connection is not a member of room {0}")]
    NotMember(RoomId),

    #[error("Socket room {0} does not exist")]
    UnknownRoom(RoomId),

    #[error("Required session attributes are missing")]
    MissingSessionState,
}

impl SessionError {
    pub fn invalid_message_type(operation: &str) -> Self {
        SessionError::MalformedRequest(format!("Invalid message type when {}", operation))
    }
}

/// Startup configuration that cannot be used
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("sample interval must be greater than zero")]
    ZeroInterval,

    #[error("invalid {name} range {range:?}")]
    InvalidRange {
        name: &'static str,
        range: RangeInclusive<i64>,
    },

    #[error("decrement range {decrement:?} exceeds bump range {bump:?}")]
    DecrementExceedsBump {
        decrement: RangeInclusive<i64>,
        bump: RangeInclusive<i64>,
    },

    #[error("expected <room>=<partner>, got '{0}'")]
    MalformedLink(String),

    #[error("invalid room id '{value}': {source}")]
    InvalidRoomId {
        value: String,
        #[source]
        source: uuid::Error,
    },

    #[error("room {0} cannot be linked to itself")]
    SelfLink(RoomId),
}
