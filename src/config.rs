use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use crate::presence::SamplerConfig;
use crate::room::{LinkedRooms, RoomLink};

/// Room-based real-time messaging relay
#[derive(Parser, Debug, Clone)]
#[command(name = "roomrelay", version, about)]
pub struct Config {
    /// Address the HTTP/WebSocket server listens on
    #[arg(long, env = "ROOMRELAY_ADDR", default_value = "0.0.0.0:3000")]
    pub addr: SocketAddr,

    /// Add randomized display offsets to reported occupancy counts
    #[arg(long, env = "ROOMRELAY_DISPLAY_OFFSETS")]
    pub display_offsets: bool,

    /// Seconds between display offset refreshes
    #[arg(
        long,
        env = "ROOMRELAY_SAMPLE_INTERVAL_SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub sample_interval_secs: u64,

    #[arg(long, default_value_t = 60)]
    pub bump_min: i64,

    #[arg(long, default_value_t = 80)]
    pub bump_max: i64,

    #[arg(long, default_value_t = 10)]
    pub decrement_min: i64,

    #[arg(long, default_value_t = 15)]
    pub decrement_max: i64,

    /// Partner room declarations, <room>=<partner>
    #[arg(long = "link", env = "ROOMRELAY_LINKS", value_delimiter = ',')]
    pub links: Vec<RoomLink>,

    /// Buffered envelopes per room topic before slow subscribers lag
    #[arg(long, env = "ROOMRELAY_TOPIC_CAPACITY", default_value_t = 100)]
    pub topic_capacity: usize,
}

impl Config {
    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            interval: Duration::from_secs(self.sample_interval_secs),
            bump_range: self.bump_min..=self.bump_max,
            decrement_range: self.decrement_min..=self.decrement_max,
        }
    }

    pub fn linked_rooms(&self) -> LinkedRooms {
        self.links.iter().copied().collect()
    }
}
