#![allow(dead_code)]

use std::sync::Arc;

use roomrelay::{
    presence::{DisplayOffsets, OffsetReader},
    room::{InMemoryRoomRegistry, LinkedRooms, RoomLink},
    websockets::InMemorySessionStore,
    SessionCoordinator,
};

use super::mocks::MockPublisher;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub coordinator: Arc<SessionCoordinator>,
    pub registry: Arc<InMemoryRoomRegistry>,
    pub publisher: Arc<MockPublisher>,
    pub sessions: Arc<InMemorySessionStore>,
}

pub struct TestSetupBuilder {
    offsets: OffsetReader,
    links: Vec<RoomLink>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            offsets: OffsetReader::disabled(),
            links: vec![],
        }
    }

    pub fn with_offsets(mut self, bump: i64, decrement: i64) -> Self {
        self.offsets = OffsetReader::fixed(DisplayOffsets { bump, decrement });
        self
    }

    pub fn with_link(mut self, link: RoomLink) -> Self {
        self.links.push(link);
        self
    }

    pub fn build(self) -> TestSetup {
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let publisher = Arc::new(MockPublisher::new());
        let sessions = Arc::new(InMemorySessionStore::new());
        let linked: LinkedRooms = self.links.into_iter().collect();

        let coordinator = Arc::new(SessionCoordinator::new(
            registry.clone(),
            publisher.clone(),
            sessions.clone(),
            self.offsets,
            linked,
        ));

        TestSetup {
            coordinator,
            registry,
            publisher,
            sessions,
        }
    }
}
