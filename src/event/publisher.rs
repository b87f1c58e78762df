use async_trait::async_trait;

use crate::room::RoomId;
use crate::websockets::messages::Envelope;

/// Publish-by-topic primitive of the transport layer. Every subscriber of a
/// room's topic receives what is published to it.
#[async_trait]
pub trait RoomPublisher: Send + Sync {
    /// Fire-and-forget delivery to the room's topic
    async fn publish(&self, room_id: &RoomId, envelope: &Envelope);

    /// Drops the room's topic if nobody is listening anymore
    async fn prune(&self, room_id: &RoomId);
}
