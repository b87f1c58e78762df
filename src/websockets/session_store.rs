use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::room::{ConnectionId, RoomId};

/// Identifier of one transport session (one WebSocket)
pub type TransportSessionId = Uuid;

/// What a transport session joined, remembered for cleanup on disconnect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionAttributes {
    pub room_id: RoomId,
    pub connection_id: ConnectionId,
}

/// Per-connection attribute store of the transport layer
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Records attributes, overwriting anything recorded earlier for the session
    async fn set_attributes(&self, session_id: TransportSessionId, attributes: SessionAttributes);

    async fn get_attributes(&self, session_id: &TransportSessionId) -> Option<SessionAttributes>;

    /// Removes and returns the session's attributes
    async fn take_attributes(&self, session_id: &TransportSessionId) -> Option<SessionAttributes>;
}

pub struct InMemorySessionStore {
    // transport session -> attributes
    sessions: Arc<RwLock<HashMap<TransportSessionId, SessionAttributes>>>,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn set_attributes(&self, session_id: TransportSessionId, attributes: SessionAttributes) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session_id, attributes);
    }

    async fn get_attributes(&self, session_id: &TransportSessionId) -> Option<SessionAttributes> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).copied()
    }

    async fn take_attributes(&self, session_id: &TransportSessionId) -> Option<SessionAttributes> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id)
    }
}
