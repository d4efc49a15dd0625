// src/rate_limiter.rs

// per-tag rate limiter: GCRA driven by epoch elapsed time instead of a wall clock

// dependencies
use crate::config::TagThrottlerConfig;
use tracing::warn;

/// Admission budget for a single tag.
///
/// Implementors convert a configured rate plus the time elapsed since the
/// previous check into a number of admissions.
pub trait TagRateLimiter {
    /// Build a limiter admitting `rate` requests per second.
    fn with_rate(rate: f64, config: &TagThrottlerConfig) -> Self
    where
        Self: Sized;

    /// Replace the configured rate. Budget already consumed is neither
    /// granted back nor revoked.
    fn set_rate(&mut self, rate: f64);

    /// Currently configured rate in requests per second.
    fn rate(&self) -> f64;

    /// Advance by `elapsed_nanos` and consume budget for up to `requested`
    /// admissions. Returns how many were granted, never more than `requested`.
    fn admit(&mut self, elapsed_nanos: u64, requested: usize) -> usize;
}

/// GCRA limiter with a bounded carry-over window.
///
/// Time is virtual: it only moves when `admit` is called. Each epoch grants
/// its full `rate * elapsed`; budget left unspent from earlier epochs is
/// capped at the carry-over window (or one emission interval, if longer).
/// A backlogged tag never leaves more than one interval unspent, so the cap
/// only ever trims budget banked while the queue was empty.
#[derive(Debug, Clone)]
pub struct GcraTagLimiter {
    rate_per_second: f64,
    rate_nanos: Option<u64>,
    tolerance_nanos: u64,
    now_nanos: u64,
    tat_nanos: u64,
}

impl GcraTagLimiter {
    // emission interval for a rate, None when the rate admits nothing
    fn interval_nanos(rate_per_second: f64) -> Option<u64> {
        if rate_per_second > 0.0 {
            Some(((1_000_000_000.0 / rate_per_second) as u64).max(1))
        } else {
            None
        }
    }

    fn sanitize(rate_per_second: f64) -> f64 {
        if rate_per_second.is_finite() && rate_per_second >= 0.0 {
            rate_per_second
        } else {
            warn!(rate = rate_per_second, "invalid tag rate treated as zero");
            0.0
        }
    }
}

impl TagRateLimiter for GcraTagLimiter {
    fn with_rate(rate: f64, config: &TagThrottlerConfig) -> Self {
        let rate_per_second = Self::sanitize(rate);
        Self {
            rate_per_second,
            rate_nanos: Self::interval_nanos(rate_per_second),
            tolerance_nanos: config.max_carry_over_nanos(),
            now_nanos: 0,
            tat_nanos: 0,
        }
    }

    fn set_rate(&mut self, rate: f64) {
        self.rate_per_second = Self::sanitize(rate);
        self.rate_nanos = Self::interval_nanos(self.rate_per_second);
    }

    fn rate(&self) -> f64 {
        self.rate_per_second
    }

    fn admit(&mut self, elapsed_nanos: u64, requested: usize) -> usize {
        if elapsed_nanos == 0 {
            return 0;
        }
        // cap carried budget before granting this epoch's share
        let window = self.tolerance_nanos.max(self.rate_nanos.unwrap_or(0));
        self.tat_nanos = self.tat_nanos.max(self.now_nanos.saturating_sub(window));
        self.now_nanos = self.now_nanos.saturating_add(elapsed_nanos);

        let Some(rate_nanos) = self.rate_nanos else {
            return 0;
        };
        if requested == 0 || self.tat_nanos >= self.now_nanos {
            return 0;
        }

        let available = (self.now_nanos - self.tat_nanos) / rate_nanos;
        let admitted = available.min(requested as u64);
        self.tat_nanos += admitted * rate_nanos;
        admitted as usize
    }
}
