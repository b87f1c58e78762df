#![allow(dead_code)] // Test utilities may not all be used in every test

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use roomrelay::room::RoomId;
use roomrelay::{Envelope, RoomPublisher};

// ============================================================================
// Mock Infrastructure
// ============================================================================

#[derive(Clone, Default)]
pub struct MockPublisher {
    published: Arc<RwLock<HashMap<RoomId, Vec<Envelope>>>>,
    pruned: Arc<RwLock<Vec<RoomId>>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_envelopes_for(&self, room_id: &RoomId) -> Vec<Envelope> {
        self.published
            .read()
            .await
            .get(room_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn was_pruned(&self, room_id: &RoomId) -> bool {
        self.pruned.read().await.contains(room_id)
    }

    pub async fn clear_envelopes(&self) {
        self.published.write().await.clear();
    }
}

#[async_trait]
impl RoomPublisher for MockPublisher {
    async fn publish(&self, room_id: &RoomId, envelope: &Envelope) {
        self.published
            .write()
            .await
            .entry(*room_id)
            .or_default()
            .push(envelope.clone());
    }

    async fn prune(&self, room_id: &RoomId) {
        self.pruned.write().await.push(*room_id);
    }
}
