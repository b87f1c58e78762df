use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type RoomId = Uuid;
pub type ConnectionId = Uuid;
pub type OwnerId = Uuid;

/// A single member of a room, scoped to that room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub connection_id: ConnectionId, // Transport session of the member, unique within a room
    pub owner_id: OwnerId,           // Owning account, carried for downstream authorization
}

impl Participant {
    pub fn new(connection_id: ConnectionId, owner_id: OwnerId) -> Self {
        Self {
            connection_id,
            owner_id,
        }
    }
}

/// In-memory record for one room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomEntry {
    pub id: RoomId,
    members: Vec<Participant>,
    tags: Vec<String>,
    multi_user: bool,
}

impl RoomEntry {
    /// Creates a room whose sole member is the creator
    pub fn new(id: RoomId, tags: Vec<String>, multi_user: bool, creator: Participant) -> Self {
        Self {
            id,
            members: vec![creator],
            tags,
            multi_user,
        }
    }

    /// Get the current number of members
    pub fn occupancy(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_multi_user(&self) -> bool {
        self.multi_user
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn members(&self) -> &[Participant] {
        &self.members
    }

    /// Tag sequences match only when equal element by element, in order
    pub fn matches_tags(&self, tags: &[String]) -> bool {
        self.tags.as_slice() == tags
    }

    /// Check if a connection is already a member of this room
    pub fn has_member(&self, connection_id: &ConnectionId) -> bool {
        self.members
            .iter()
            .any(|m| &m.connection_id == connection_id)
    }

    /// A single-user joiner never mixes with a multi-user room, and vice versa
    pub fn is_type_mismatch(&self, multi_user: bool) -> bool {
        self.multi_user != multi_user
    }

    /// Add a member unless the connection is already present.
    /// Returns whether the member was added.
    pub(crate) fn add_member(&mut self, participant: Participant) -> bool {
        if self.has_member(&participant.connection_id) {
            return false;
        }
        self.members.push(participant);
        true
    }

    /// Remove a member by connection. Returns whether anything was removed.
    pub(crate) fn remove_member(&mut self, connection_id: &ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| &m.connection_id != connection_id);
        self.members.len() != before
    }
}
