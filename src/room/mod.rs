// Public API - what other modules can use
pub use linked::{LinkedRooms, RoomLink};
pub use models::{ConnectionId, OwnerId, Participant, RoomEntry, RoomId};
pub use registry::{InMemoryRoomRegistry, JoinRoomResult, LeaveRoomResult, RoomRegistry};

// Internal modules
pub mod linked;
pub mod models;
pub mod registry;
