// src/config.rs

//! Configuration types for the tag throttler

// dependencies
use crate::errors::TagThrottlerError;

/// How requests carrying only tags without a configured quota are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownTagPolicy {
    /// Unknown tags are ignored; if none of a request's tags has a quota the
    /// request bypasses throttling.
    #[default]
    PassThrough,
    /// Unknown tags create a closed queue that holds requests until a rate
    /// is first assigned to the tag.
    Hold,
}

/// Configuration for tag throttler behavior
#[derive(Debug, Clone)]
pub struct TagThrottlerConfig {
    pub(crate) max_carry_over_secs: f64,
    pub(crate) unknown_tag_policy: UnknownTagPolicy,
}

impl Default for TagThrottlerConfig {
    fn default() -> Self {
        Self {
            max_carry_over_secs: 1.0,
            unknown_tag_policy: UnknownTagPolicy::PassThrough,
        }
    }
}

impl TagThrottlerConfig {
    /// Create a new configuration with a carry-over window and unknown tag policy
    pub fn new(max_carry_over_secs: f64, unknown_tag_policy: UnknownTagPolicy) -> Self {
        Self {
            max_carry_over_secs,
            unknown_tag_policy,
        }
    }

    /// Builder-style: set the carry-over window in seconds
    pub fn carry_over(mut self, max_carry_over_secs: f64) -> Self {
        self.max_carry_over_secs = max_carry_over_secs;
        self
    }

    /// Builder-style: set the unknown tag policy
    pub fn unknown_tags(mut self, policy: UnknownTagPolicy) -> Self {
        self.unknown_tag_policy = policy;
        self
    }

    /// Seconds of unused budget a tag may carry into a later epoch
    pub fn max_carry_over_secs(&self) -> f64 {
        self.max_carry_over_secs
    }

    pub fn unknown_tag_policy(&self) -> UnknownTagPolicy {
        self.unknown_tag_policy
    }

    pub(crate) fn max_carry_over_nanos(&self) -> u64 {
        (self.max_carry_over_secs * 1_000_000_000.0) as u64
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), TagThrottlerError> {
        if !self.max_carry_over_secs.is_finite() || self.max_carry_over_secs <= 0.0 {
            return Err(TagThrottlerError::InvalidCarryOver {
                seconds: self.max_carry_over_secs,
            });
        }
        Ok(())
    }
}
