use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::publisher::RoomPublisher;
use crate::room::RoomId;
use crate::websockets::messages::Envelope;

/// Event bus for distributing envelopes to room topics
#[derive(Debug, Clone)]
pub struct EventBus {
    /// Room-specific topics: room_id -> sender
    room_channels: Arc<RwLock<HashMap<RoomId, broadcast::Sender<Envelope>>>>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

impl EventBus {
    /// Creates a new event bus; `capacity` is the per-topic buffer
    pub fn new(capacity: usize) -> Self {
        Self {
            room_channels: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Emits an envelope to all subscribers of a specific room
    pub async fn emit_to_room(&self, room_id: &RoomId, envelope: Envelope) {
        let room_channels = self.room_channels.read().await;

        match room_channels.get(room_id) {
            Some(sender) => match sender.send(envelope) {
                Ok(receiver_count) => {
                    debug!(
                        room_id = %room_id,
                        receivers = receiver_count,
                        "Room envelope emitted"
                    );
                }
                Err(_) => {
                    debug!(room_id = %room_id, "Room envelope emitted with no receivers");
                }
            },
            // Nobody ever subscribed, so there is nobody to deliver to
            None => debug!(room_id = %room_id, "No room topic, envelope dropped"),
        }
    }

    /// Subscribe to envelopes for a specific room
    pub async fn subscribe_to_room(&self, room_id: &RoomId) -> broadcast::Receiver<Envelope> {
        {
            let room_channels = self.room_channels.read().await;
            if let Some(sender) = room_channels.get(room_id) {
                return sender.subscribe();
            }
        }

        debug!(room_id = %room_id, "Creating new room topic for subscription");
        let mut room_channels = self.room_channels.write().await;
        // Another subscriber may have created the topic while we waited for the write lock
        room_channels
            .entry(*room_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Removes the topic if it has no live receivers
    pub async fn remove_idle_room(&self, room_id: &RoomId) -> bool {
        let mut room_channels = self.room_channels.write().await;
        let idle = room_channels
            .get(room_id)
            .map(|sender| sender.receiver_count() == 0)
            .unwrap_or(false);

        if idle {
            room_channels.remove(room_id);
            debug!(room_id = %room_id, "Removed idle room topic");
        }
        idle
    }

    pub async fn topic_count(&self) -> usize {
        self.room_channels.read().await.len()
    }
}

#[async_trait]
impl RoomPublisher for EventBus {
    async fn publish(&self, room_id: &RoomId, envelope: &Envelope) {
        self.emit_to_room(room_id, envelope.clone()).await;
    }

    async fn prune(&self, room_id: &RoomId) {
        self.remove_idle_room(room_id).await;
    }
}
