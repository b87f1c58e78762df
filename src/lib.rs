// Library crate for the room relay server
// This file exposes the public API for the binary and integration tests

pub mod config;
pub mod event;
pub mod presence;
pub mod room;
pub mod router;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use config::Config;
pub use event::{EventBus, RoomPublisher};
pub use presence::{OffsetReader, PresenceSampler};
pub use room::{InMemoryRoomRegistry, JoinRoomResult, LeaveRoomResult, RoomRegistry};
pub use shared::{AppState, ConfigError, SessionError};
pub use websockets::{Envelope, MessageType, SessionCoordinator, SessionRequest};
