// Topic-based delivery of outbound envelopes
//
// The bus is the in-process stand-in for the transport's publish-by-topic
// primitive: one broadcast channel per room, fed by the session coordinator
// and drained by the WebSocket connections subscribed to that room.

// Public API - what other modules can use
pub use bus::EventBus;
pub use publisher::RoomPublisher;

// Internal modules
mod bus;
mod publisher;
