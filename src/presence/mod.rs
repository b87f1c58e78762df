// Display-smoothing for reported occupancy counts.
//
// Nothing in here feeds back into the room registry; offsets are only applied
// where counts are written into outbound envelopes.

pub use display::DisplayCounts;
pub use sampler::{DisplayOffsets, OffsetReader, PresenceSampler, SamplerConfig};

mod display;
mod sampler;
