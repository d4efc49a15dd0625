// src/tag_throttler.rs

// tag throttler: per-tag quota enforcement in front of the priority queues

// dependencies
use crate::clock::{Clock, SystemClock};
use crate::config::{TagThrottlerConfig, UnknownTagPolicy};
use crate::errors::TagThrottlerError;
use crate::rate_limiter::{GcraTagLimiter, TagRateLimiter};
use crate::request::{TaggedRequest, TransactionTag, route};
use crate::tag_queue::TagQueue;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, trace, warn};

/// Counts from one `release_transactions` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseStats {
    /// Requests released from tag queues.
    pub tagged_released: usize,
    /// Pass-through requests released.
    pub untagged_released: usize,
    /// Requests still waiting in tag queues after the release.
    pub tagged_remaining: usize,
}

impl ReleaseStats {
    pub fn total_released(&self) -> usize {
        self.tagged_released + self.untagged_released
    }
}

/// Throttles tagged requests against per-tag rates before they reach the
/// priority-partitioned output queues.
///
/// R is the request type, C the clock used to stamp queued requests and L
/// the per-tag limiter, defaulting to `GcraTagLimiter`.
///
/// Every method takes `&self`, so one instance can be shared across threads.
/// Locking is per shard of the tag map plus one mutex for pass-through
/// requests rather than a single lock per call: each tag queue is updated
/// atomically, but `release_transactions` and a multi-tag `update_rates` are
/// not atomic as a whole. A request added during a release is drained in the
/// current epoch or the next, according to its place in its tag's FIFO.
#[derive(Debug)]
pub struct TagThrottler<R, C = SystemClock, L = GcraTagLimiter>
where
    R: TaggedRequest,
    C: Clock,
    L: TagRateLimiter,
{
    config: TagThrottlerConfig,
    queues: DashMap<TransactionTag, TagQueue<R, L>>,
    // requests with no throttled tag, released every epoch
    untagged: Mutex<VecDeque<R>>,
    clock: C,
}

impl<R, C> TagThrottler<R, C>
where
    R: TaggedRequest,
    C: Clock,
{
    /// Create a throttler with the default configuration
    pub fn new(clock: C) -> Self {
        Self::build(TagThrottlerConfig::default(), clock)
    }

    /// Create a throttler from a config object
    pub fn with_config(config: TagThrottlerConfig, clock: C) -> Result<Self, TagThrottlerError> {
        Self::with_limiter_config(config, clock)
    }
}

impl<R, C, L> TagThrottler<R, C, L>
where
    R: TaggedRequest,
    C: Clock,
    L: TagRateLimiter,
{
    /// Create a throttler using a custom per-tag limiter
    pub fn with_limiter_config(
        config: TagThrottlerConfig,
        clock: C,
    ) -> Result<Self, TagThrottlerError> {
        config.validate()?;
        Ok(Self::build(config, clock))
    }

    fn build(config: TagThrottlerConfig, clock: C) -> Self {
        Self {
            config,
            queues: DashMap::new(),
            untagged: Mutex::new(VecDeque::new()),
            clock,
        }
    }

    pub fn config(&self) -> &TagThrottlerConfig {
        &self.config
    }

    /// Queue a request behind its home tag, or pass it through when none of
    /// its tags is throttled. Never blocks and never rejects.
    pub fn add_request(&self, request: R) {
        let Some(tag) = self.home_tag(&request) else {
            self.untagged.lock().push_back(request);
            return;
        };

        let now = match self.clock.now() {
            Ok(now) => Some(now),
            Err(error) => {
                warn!(%tag, %error, "clock unavailable, reusing last enqueue time");
                None
            }
        };

        self.queues
            .entry(tag.clone())
            .or_insert_with(|| {
                debug!(%tag, "created closed tag queue");
                TagQueue::closed()
            })
            .push(request, now);
    }

    // The most restrictive throttled tag, ties going to the smallest tag.
    fn home_tag(&self, request: &R) -> Option<TransactionTag> {
        let hold_unknown = self.config.unknown_tag_policy == UnknownTagPolicy::Hold;
        let mut candidates = 0usize;
        let mut home: Option<(f64, &TransactionTag)> = None;

        for tag in request.tags() {
            let rate = match self.queues.get(tag) {
                Some(queue) => queue.effective_rate(),
                None if hold_unknown => 0.0,
                None => continue,
            };
            candidates += 1;

            let better = match home {
                None => true,
                Some((best_rate, best_tag)) => rate
                    .total_cmp(&best_rate)
                    .then_with(|| tag.cmp(best_tag))
                    .is_lt(),
            };
            if better {
                home = Some((rate, tag));
            }
        }

        let (rate, tag) = home?;
        if candidates > 1 {
            debug!(%tag, rate, candidates, "homed multi-tag request");
        }
        Some(tag.clone())
    }

    /// Apply rates from the rate-governing authority. Tags missing from
    /// `new_rates` keep whatever rate they had.
    pub fn update_rates(&self, new_rates: &HashMap<TransactionTag, f64>) {
        for (tag, &rate) in new_rates {
            match self.queues.entry(tag.clone()) {
                Entry::Occupied(mut entry) => {
                    if entry.get_mut().set_rate(rate, &self.config) {
                        debug!(%tag, rate, "activated tag limiter");
                    }
                }
                Entry::Vacant(entry) => {
                    debug!(%tag, rate, "created tag queue");
                    entry.insert(TagQueue::with_rate(rate, &self.config));
                }
            }
        }
    }

    /// Run one epoch. `elapsed` is the wall-clock seconds since the previous
    /// call; zero, negative or NaN values release nothing from tag queues.
    /// Admitted requests and every pass-through request are appended to the
    /// output for their priority.
    pub fn release_transactions(
        &self,
        elapsed: f64,
        out_batch: &mut VecDeque<R>,
        out_default: &mut VecDeque<R>,
    ) -> ReleaseStats {
        let elapsed_nanos = if elapsed > 0.0 {
            (elapsed * 1_000_000_000.0) as u64
        } else {
            0
        };
        // only feeds latency reporting
        let now = self.clock.now().unwrap_or(0);

        let mut stats = ReleaseStats::default();
        for mut entry in self.queues.iter_mut() {
            let queue = entry.value_mut();
            let release = queue.release_transactions(elapsed_nanos, now, out_batch, out_default);
            let remaining = queue.len();
            stats.tagged_released += release.released;
            stats.tagged_remaining += remaining;

            if release.released > 0 || !queue.is_empty() {
                trace!(
                    tag = %entry.key(),
                    released = release.released,
                    remaining,
                    max_delay_ms = release.max_delay_nanos / 1_000_000,
                    "released tag queue"
                );
            }
        }

        let untagged = std::mem::take(&mut *self.untagged.lock());
        stats.untagged_released = untagged.len();
        for request in untagged {
            route(request, out_batch, out_default);
        }
        trace!(
            released = stats.total_released(),
            remaining = stats.tagged_remaining,
            "epoch released"
        );
        stats
    }

    /// Number of tags currently tracked
    pub fn size(&self) -> usize {
        self.queues.len()
    }

    /// Requests waiting under `tag`, `None` if the tag is not tracked
    pub fn queued(&self, tag: &str) -> Option<usize> {
        self.queues.get(tag).map(|queue| queue.len())
    }

    /// Rate configured for `tag`, `None` if untracked or never assigned
    pub fn rate(&self, tag: &str) -> Option<f64> {
        self.queues.get(tag).and_then(|queue| queue.rate())
    }

    /// Pass-through requests waiting for the next epoch
    pub fn untagged_len(&self) -> usize {
        self.untagged.lock().len()
    }
}
