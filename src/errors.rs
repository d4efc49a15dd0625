// src/errors.rs

// error handling for the tag throttler

/// Error type for tag throttler configuration issues.
#[non_exhaustive]
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TagThrottlerError {
    /// The carry-over window is not finite and positive.
    #[error("Invalid carry-over window: {seconds}s. Window must be finite and positive.")]
    InvalidCarryOver {
        /// The rejected window, in seconds.
        seconds: f64,
    },
}
