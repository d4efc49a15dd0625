// tests/throttler/fixtures/requests.rs

// dependencies
use super::test_clock::TestClock;
use std::collections::{HashMap, VecDeque};
use tag_throttler::{Priority, ReadVersionRequest, ReleaseStats, TagThrottler, TransactionTag};

pub type Request = ReadVersionRequest<u32>;
pub type Throttler = TagThrottler<Request, TestClock>;

pub fn throttler() -> (Throttler, TestClock) {
    let clock = TestClock::new(0.0);
    (TagThrottler::new(clock.clone()), clock)
}

pub fn tagged(id: u32, priority: Priority, tags: &[&str]) -> Request {
    tags.iter()
        .fold(ReadVersionRequest::new(priority, id), |req, tag| req.tag(*tag))
}

pub fn rates(entries: &[(&str, f64)]) -> HashMap<TransactionTag, f64> {
    entries
        .iter()
        .map(|(tag, rate)| (TransactionTag::from(*tag), *rate))
        .collect()
}

/// Outcome of one epoch, as request ids per output
#[derive(Debug, Default)]
pub struct Released {
    pub batch: Vec<u32>,
    pub default: Vec<u32>,
    pub stats: ReleaseStats,
}

impl Released {
    pub fn all(&self) -> Vec<u32> {
        self.batch.iter().chain(&self.default).copied().collect()
    }
}

pub fn release(throttler: &Throttler, elapsed: f64) -> Released {
    let mut batch = VecDeque::new();
    let mut default = VecDeque::new();
    let stats = throttler.release_transactions(elapsed, &mut batch, &mut default);
    Released {
        batch: batch.into_iter().map(|r| r.payload).collect(),
        default: default.into_iter().map(|r| r.payload).collect(),
        stats,
    }
}
