// Public API
pub use coordinator::SessionCoordinator;
pub use handler::{websocket_handler, WebsocketReceiveHandler};
pub use messages::{Envelope, MessageType, SessionRequest};
pub use session_store::{InMemorySessionStore, SessionAttributes, SessionStore, TransportSessionId};
pub use socket::{Connection, HandlerOutcome, MessageHandler, SocketError, SocketWrapper};

// Internal modules
pub mod coordinator;
mod handler;
pub mod messages;
pub mod session_store;
mod socket;
