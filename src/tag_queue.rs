// src/tag_queue.rs

// per-tag FIFO of delayed requests and the limiter that meters it

// dependencies
use crate::config::TagThrottlerConfig;
use crate::rate_limiter::{GcraTagLimiter, TagRateLimiter};
use crate::request::{TaggedRequest, route};
use std::collections::VecDeque;

/// A queued request and the time it was enqueued.
#[derive(Debug, Clone)]
pub struct DelayedRequest<R> {
    pub request: R,
    /// Clock nanoseconds at enqueue; non-decreasing along a queue.
    pub start_time_nanos: u64,
}

/// Limiter lifecycle of a tag queue.
///
/// A queue starts `Closed` when a request references a tag that has never
/// been given a rate, and becomes `Active` on the first rate update. There
/// is no way back to `Closed`.
#[derive(Debug, Clone)]
pub enum LimiterState<L> {
    Closed,
    Active(L),
}

/// Outcome of draining one tag queue for an epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueRelease {
    pub released: usize,
    /// Longest time a released request spent queued.
    pub max_delay_nanos: u64,
}

#[derive(Debug)]
pub struct TagQueue<R, L = GcraTagLimiter> {
    limiter: LimiterState<L>,
    requests: VecDeque<DelayedRequest<R>>,
}

impl<R, L> TagQueue<R, L>
where
    R: TaggedRequest,
    L: TagRateLimiter,
{
    pub fn closed() -> Self {
        Self {
            limiter: LimiterState::Closed,
            requests: VecDeque::new(),
        }
    }

    pub fn with_rate(rate: f64, config: &TagThrottlerConfig) -> Self {
        Self {
            limiter: LimiterState::Active(L::with_rate(rate, config)),
            requests: VecDeque::new(),
        }
    }

    /// Set the limiter rate, activating a closed queue.
    /// Returns true when this call performed the activation.
    pub fn set_rate(&mut self, rate: f64, config: &TagThrottlerConfig) -> bool {
        match &mut self.limiter {
            LimiterState::Active(limiter) => {
                limiter.set_rate(rate);
                false
            }
            LimiterState::Closed => {
                self.limiter = LimiterState::Active(L::with_rate(rate, config));
                true
            }
        }
    }

    /// Configured rate, `None` while closed.
    pub fn rate(&self) -> Option<f64> {
        match &self.limiter {
            LimiterState::Active(limiter) => Some(limiter.rate()),
            LimiterState::Closed => None,
        }
    }

    /// Rate used when ranking tags; a closed queue admits nothing.
    pub fn effective_rate(&self) -> f64 {
        self.rate().unwrap_or(0.0)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.limiter, LimiterState::Active(_))
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Append a request stamped with `now_nanos`. A missing or earlier
    /// timestamp is replaced by the last one in the queue.
    pub fn push(&mut self, request: R, now_nanos: Option<u64>) {
        let last = self.requests.back().map_or(0, |d| d.start_time_nanos);
        let start_time_nanos = now_nanos.unwrap_or(last).max(last);
        self.requests.push_back(DelayedRequest {
            request,
            start_time_nanos,
        });
    }

    /// Release as many queued requests as the limiter allows for an epoch of
    /// `elapsed_nanos`, oldest first, appending each to the output for its
    /// priority. Requests left behind keep their order.
    pub fn release_transactions(
        &mut self,
        elapsed_nanos: u64,
        now_nanos: u64,
        out_batch: &mut VecDeque<R>,
        out_default: &mut VecDeque<R>,
    ) -> QueueRelease {
        let allowed = match &mut self.limiter {
            LimiterState::Active(limiter) => limiter.admit(elapsed_nanos, self.requests.len()),
            LimiterState::Closed => 0,
        };

        let count = allowed.min(self.requests.len());
        let mut release = QueueRelease::default();
        for delayed in self.requests.drain(..count) {
            release.released += 1;
            release.max_delay_nanos = release
                .max_delay_nanos
                .max(now_nanos.saturating_sub(delayed.start_time_nanos));
            route(delayed.request, out_batch, out_default);
        }
        release
    }
}
