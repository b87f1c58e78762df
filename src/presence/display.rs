use super::sampler::DisplayOffsets;

/// Occupancy figures as they appear in outbound envelopes. Only ever built at
/// serialisation time; registry counts stay raw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayCounts {
    pub room_count: i64,
    pub linked_room_count: Option<i64>,
}

impl DisplayCounts {
    pub fn decorate(
        room_occupancy: usize,
        linked_occupancy: Option<usize>,
        offsets: DisplayOffsets,
    ) -> Self {
        Self {
            room_count: (room_occupancy as i64 + offsets.bump).max(0),
            linked_room_count: linked_occupancy
                .map(|count| (count as i64 + offsets.bump - offsets.decrement).max(0)),
        }
    }
}
