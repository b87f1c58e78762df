use std::collections::HashMap;
use std::str::FromStr;

use super::models::RoomId;
use crate::shared::ConfigError;

/// Optional partner relation between rooms. A room declares at most one
/// partner whose occupancy is reported alongside its own.
#[derive(Debug, Clone, Default)]
pub struct LinkedRooms {
    partners: HashMap<RoomId, RoomId>,
}

impl LinkedRooms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `partner` for `room_id`, replacing any previous declaration
    pub fn link(&mut self, room_id: RoomId, partner: RoomId) {
        self.partners.insert(room_id, partner);
    }

    pub fn partner_of(&self, room_id: &RoomId) -> Option<RoomId> {
        self.partners.get(room_id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }
}

impl FromIterator<RoomLink> for LinkedRooms {
    fn from_iter<I: IntoIterator<Item = RoomLink>>(iter: I) -> Self {
        let mut linked = LinkedRooms::new();
        for RoomLink { room_id, partner } in iter {
            linked.link(room_id, partner);
        }
        linked
    }
}

/// One `<room>=<partner>` declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomLink {
    pub room_id: RoomId,
    pub partner: RoomId,
}

impl FromStr for RoomLink {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (room, partner) = s
            .split_once('=')
            .ok_or_else(|| ConfigError::MalformedLink(s.to_string()))?;

        let room_id = parse_room_id(room)?;
        let partner = parse_room_id(partner)?;

        if room_id == partner {
            return Err(ConfigError::SelfLink(room_id));
        }

        Ok(RoomLink { room_id, partner })
    }
}

fn parse_room_id(value: &str) -> Result<RoomId, ConfigError> {
    RoomId::parse_str(value.trim()).map_err(|source| ConfigError::InvalidRoomId {
        value: value.to_string(),
        source,
    })
}
