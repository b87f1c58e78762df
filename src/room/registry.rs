use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, instrument};

use super::models::{ConnectionId, OwnerId, Participant, RoomEntry, RoomId};

/// Result of attempting to join a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinRoomResult {
    /// Joined the room (possibly a category-matched one); `created` is set when
    /// this join brought the room into existence
    Joined {
        room_id: RoomId,
        occupancy: usize,
        created: bool,
    },
    /// The connection is already a member of the target room
    AlreadyMember { room_id: RoomId },
    /// The room's multi-user flag differs from the requested one
    TypeMismatch { room_id: RoomId },
}

impl JoinRoomResult {
    pub fn is_success(&self) -> bool {
        matches!(self, JoinRoomResult::Joined { .. })
    }

    /// Room assigned to the joiner, only present on success
    pub fn room_id(&self) -> Option<RoomId> {
        match self {
            JoinRoomResult::Joined { room_id, .. } => Some(*room_id),
            _ => None,
        }
    }

    pub fn occupancy(&self) -> Option<usize> {
        match self {
            JoinRoomResult::Joined { occupancy, .. } => Some(*occupancy),
            _ => None,
        }
    }
}

/// Result of attempting to leave a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveRoomResult {
    /// Left the room, returns the remaining member count
    Left { room_id: RoomId, occupancy: usize },
    /// The last member left and the room was evicted
    RoomDeleted { room_id: RoomId },
    /// Connection was not in the room
    NotMember,
    /// Room does not exist
    RoomNotFound,
}

impl LeaveRoomResult {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            LeaveRoomResult::Left { .. } | LeaveRoomResult::RoomDeleted { .. }
        )
    }

    /// Post-removal member count, 0 when the room was evicted
    pub fn occupancy(&self) -> Option<usize> {
        match self {
            LeaveRoomResult::Left { occupancy, .. } => Some(*occupancy),
            LeaveRoomResult::RoomDeleted { .. } => Some(0),
            _ => None,
        }
    }
}

/// Room Session Registry: tracks which participants belong to which room
#[async_trait]
pub trait RoomRegistry {
    async fn exists(&self, room_id: &RoomId) -> bool;

    /// Joins a room. Non-empty `tags` first try to attach to an existing room
    /// with the exact same tag sequence, otherwise `room_id` is joined or created.
    async fn join(
        &self,
        connection_id: ConnectionId,
        owner_id: OwnerId,
        room_id: RoomId,
        tags: Vec<String>,
        multi_user: bool,
    ) -> JoinRoomResult;

    /// Removes a connection from a room, evicting the room once it is empty
    async fn leave(&self, connection_id: &ConnectionId, room_id: &RoomId) -> LeaveRoomResult;

    /// Current member count, 0 if the room is absent
    async fn occupancy(&self, room_id: &RoomId) -> usize;

    async fn room_count(&self) -> usize;

    /// Read-only copy of a room's state
    async fn snapshot(&self, room_id: &RoomId) -> Option<RoomEntry>;
}

/// In-memory registry backed by a sharded concurrent map
pub struct InMemoryRoomRegistry {
    rooms: DashMap<RoomId, RoomEntry>,
    // Held across scan-then-create for tagged joins, so two joiners with the
    // same tags cannot each create a room. Leaves never take it.
    category_lock: Mutex<()>,
}

impl Default for InMemoryRoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoomRegistry {
    /// Creates a new empty registry
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            category_lock: Mutex::new(()),
        }
    }

    /// First room, in map iteration order, whose tags equal `tags`
    fn find_room_by_tags(&self, tags: &[String]) -> Option<RoomId> {
        self.rooms
            .iter()
            .find(|entry| entry.value().matches_tags(tags))
            .map(|entry| *entry.key())
    }

    /// Applies the duplicate and type checks, then appends the participant.
    /// Callers hold the room's shard lock for the duration.
    fn admit(room: &mut RoomEntry, participant: Participant, multi_user: bool) -> JoinRoomResult {
        if room.has_member(&participant.connection_id) {
            debug!(room_id = %room.id, connection_id = %participant.connection_id, "Connection already in room");
            return JoinRoomResult::AlreadyMember { room_id: room.id };
        }

        if room.is_type_mismatch(multi_user) {
            debug!(
                room_id = %room.id,
                room_multi_user = room.is_multi_user(),
                requested_multi_user = multi_user,
                "Room type mismatch"
            );
            return JoinRoomResult::TypeMismatch { room_id: room.id };
        }

        room.add_member(participant);
        JoinRoomResult::Joined {
            room_id: room.id,
            occupancy: room.occupancy(),
            created: false,
        }
    }

    /// Returns None when no room carries these tags
    fn join_by_tags(
        &self,
        participant: &Participant,
        tags: &[String],
        multi_user: bool,
    ) -> Option<JoinRoomResult> {
        let matched = self.find_room_by_tags(tags)?;
        self.join_matched(matched, participant, tags, multi_user)
    }

    /// Joins a room picked by the category scan. Returns None when it was
    /// evicted, or its id reused with other tags, before its lock was taken.
    fn join_matched(
        &self,
        matched: RoomId,
        participant: &Participant,
        tags: &[String],
        multi_user: bool,
    ) -> Option<JoinRoomResult> {
        let mut room = self.rooms.get_mut(&matched)?;
        if !room.matches_tags(tags) {
            return None;
        }

        let result = Self::admit(&mut room, participant.clone(), multi_user);
        if result.is_success() {
            info!(
                room_id = %matched,
                connection_id = %participant.connection_id,
                occupancy = room.occupancy(),
                "Connection joined room by category"
            );
        }
        Some(result)
    }

    fn join_by_id(
        &self,
        participant: Participant,
        room_id: RoomId,
        tags: Vec<String>,
        multi_user: bool,
    ) -> JoinRoomResult {
        // The entry API makes creation a single winner decision per identifier
        match self.rooms.entry(room_id) {
            Entry::Occupied(mut entry) => {
                let connection_id = participant.connection_id;
                let result = Self::admit(entry.get_mut(), participant, multi_user);
                if let JoinRoomResult::Joined { occupancy, .. } = result {
                    info!(
                        room_id = %room_id,
                        connection_id = %connection_id,
                        occupancy = occupancy,
                        "Connection joined room"
                    );
                }
                result
            }
            Entry::Vacant(entry) => {
                let connection_id = participant.connection_id;
                entry.insert(RoomEntry::new(room_id, tags, multi_user, participant));
                info!(
                    room_id = %room_id,
                    connection_id = %connection_id,
                    multi_user = multi_user,
                    "Room created"
                );
                JoinRoomResult::Joined {
                    room_id,
                    occupancy: 1,
                    created: true,
                }
            }
        }
    }

    fn leave_room(&self, connection_id: &ConnectionId, room_id: &RoomId) -> LeaveRoomResult {
        let mut entry = match self.rooms.entry(*room_id) {
            Entry::Occupied(entry) => entry,
            Entry::Vacant(_) => {
                debug!(room_id = %room_id, "Room not found");
                return LeaveRoomResult::RoomNotFound;
            }
        };

        if !entry.get_mut().remove_member(connection_id) {
            debug!(room_id = %room_id, connection_id = %connection_id, "Connection not in room");
            return LeaveRoomResult::NotMember;
        }

        // Evict under the same lock that removed the last member
        if entry.get().is_empty() {
            entry.remove();
            info!(room_id = %room_id, "Room is now empty, deleting");
            return LeaveRoomResult::RoomDeleted { room_id: *room_id };
        }

        let occupancy = entry.get().occupancy();
        info!(
            room_id = %room_id,
            connection_id = %connection_id,
            occupancy = occupancy,
            "Connection left room"
        );
        LeaveRoomResult::Left {
            room_id: *room_id,
            occupancy,
        }
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn exists(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    #[instrument(skip(self, tags))]
    async fn join(
        &self,
        connection_id: ConnectionId,
        owner_id: OwnerId,
        room_id: RoomId,
        tags: Vec<String>,
        multi_user: bool,
    ) -> JoinRoomResult {
        let participant = Participant::new(connection_id, owner_id);

        if tags.is_empty() {
            return self.join_by_id(participant, room_id, tags, multi_user);
        }

        let _category = self
            .category_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(result) = self.join_by_tags(&participant, &tags, multi_user) {
            return result;
        }
        debug!(tags = ?tags, "No room matches category, joining by id");
        self.join_by_id(participant, room_id, tags, multi_user)
    }

    #[instrument(skip(self))]
    async fn leave(&self, connection_id: &ConnectionId, room_id: &RoomId) -> LeaveRoomResult {
        self.leave_room(connection_id, room_id)
    }

    async fn occupancy(&self, room_id: &RoomId) -> usize {
        self.rooms
            .get(room_id)
            .map(|room| room.occupancy())
            .unwrap_or(0)
    }

    async fn room_count(&self) -> usize {
        self.rooms.len()
    }

    async fn snapshot(&self, room_id: &RoomId) -> Option<RoomEntry> {
        self.rooms.get(room_id).map(|room| room.value().clone())
    }
}
