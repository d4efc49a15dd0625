// src/epoch.rs

// epoch timing for whatever drives release_transactions

// dependencies
use crate::clock::Clock;
use tracing::warn;

/// Measures the wall-clock time between successive epochs.
///
/// The value returned by `tick` is meant to be passed straight to
/// `TagThrottler::release_transactions`.
#[derive(Debug)]
pub struct EpochTimer<C: Clock> {
    clock: C,
    last_nanos: Option<u64>,
}

impl<C: Clock> EpochTimer<C> {
    pub fn new(clock: C) -> Self {
        let last_nanos = clock.now().ok();
        Self { clock, last_nanos }
    }

    /// Seconds since the previous tick, or since construction for the first.
    /// A clock failure yields zero for this tick.
    pub fn tick(&mut self) -> f64 {
        match self.clock.now() {
            Ok(now) => {
                let elapsed = self.last_nanos.map_or(0, |last| now.saturating_sub(last));
                self.last_nanos = Some(now);
                elapsed as f64 / 1_000_000_000.0
            }
            Err(error) => {
                warn!(%error, "clock unavailable, treating epoch as empty");
                0.0
            }
        }
    }
}
