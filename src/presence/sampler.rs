use rand::Rng;
use std::ops::RangeInclusive;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::shared::ConfigError;

/// Configuration for the presence sampler
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// How often the offsets are re-rolled
    pub interval: Duration,
    /// Bounds for the amount added to displayed occupancy
    pub bump_range: RangeInclusive<i64>,
    /// Bounds for the amount taken back off linked-room counts
    pub decrement_range: RangeInclusive<i64>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            bump_range: 60..=80,
            decrement_range: 10..=15,
        }
    }
}

impl SamplerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.bump_range.is_empty() || *self.bump_range.start() < 0 {
            return Err(ConfigError::InvalidRange {
                name: "bump",
                range: self.bump_range.clone(),
            });
        }
        if self.decrement_range.is_empty() || *self.decrement_range.start() < 0 {
            return Err(ConfigError::InvalidRange {
                name: "decrement",
                range: self.decrement_range.clone(),
            });
        }
        // The decrement must never exceed the bump it is subtracted from
        if self.decrement_range.end() > self.bump_range.start() {
            return Err(ConfigError::DecrementExceedsBump {
                decrement: self.decrement_range.clone(),
                bump: self.bump_range.clone(),
            });
        }
        Ok(())
    }
}

/// Cosmetic offsets applied to reported occupancy counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayOffsets {
    pub bump: i64,
    pub decrement: i64,
}

impl DisplayOffsets {
    fn sample(config: &SamplerConfig) -> Self {
        let mut rng = rand::rng();
        Self {
            bump: rng.random_range(config.bump_range.clone()),
            decrement: rng.random_range(config.decrement_range.clone()),
        }
    }
}

/// Read handle on the current offsets, shared by event-handling workers
#[derive(Debug, Clone)]
pub struct OffsetReader {
    receiver: watch::Receiver<DisplayOffsets>,
}

impl OffsetReader {
    /// A reader that always yields zero offsets
    pub fn disabled() -> Self {
        Self::fixed(DisplayOffsets::default())
    }

    /// A reader pinned to the given offsets
    pub fn fixed(offsets: DisplayOffsets) -> Self {
        let (_sender, receiver) = watch::channel(offsets);
        Self { receiver }
    }

    pub fn current(&self) -> DisplayOffsets {
        *self.receiver.borrow()
    }
}

/// Background task that periodically re-rolls the display offsets
pub struct PresenceSampler {
    receiver: watch::Receiver<DisplayOffsets>,
    cancel_token: CancellationToken,
    handle: JoinHandle<()>,
}

impl PresenceSampler {
    /// Takes the first sample immediately, then spawns the refresh task.
    /// Must be called from within a tokio runtime.
    pub fn start(config: SamplerConfig) -> Self {
        let initial = DisplayOffsets::sample(&config);
        info!(
            bump = initial.bump,
            decrement = initial.decrement,
            interval_secs = config.interval.as_secs(),
            "Starting presence sampler"
        );

        let (sender, receiver) = watch::channel(initial);
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(run_sampler(sender, config, cancel_token.clone()));

        Self {
            receiver,
            cancel_token,
            handle,
        }
    }

    pub fn reader(&self) -> OffsetReader {
        OffsetReader {
            receiver: self.receiver.clone(),
        }
    }

    /// Cancels the refresh task and waits for it to exit
    pub async fn shutdown(self) {
        self.cancel_token.cancel();
        let _ = self.handle.await;
        info!("Presence sampler stopped");
    }
}

async fn run_sampler(
    sender: watch::Sender<DisplayOffsets>,
    config: SamplerConfig,
    cancel_token: CancellationToken,
) {
    let mut ticker = interval(config.interval);
    // First tick fires immediately and the initial sample is already published
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => break,
            _ = ticker.tick() => {
                let offsets = DisplayOffsets::sample(&config);
                sender.send_replace(offsets);
                debug!(bump = offsets.bump, decrement = offsets.decrement, "Display offsets refreshed");
            }
        }
    }
}
