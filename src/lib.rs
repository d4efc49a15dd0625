// src/lib.rs

//! # Tag Throttler
//!
//! Per-tag admission control for read-version requests. Each workload tag
//! gets a FIFO queue metered by a GCRA limiter; every epoch the throttler
//! releases what each tag's rate allows, plus all untagged traffic, into
//! batch and default priority outputs.
//!
//! ## Quick Example
//!
//! ```rust
//! use std::collections::{HashMap, VecDeque};
//! use tag_throttler::{Priority, ReadVersionRequest, SystemClock, TagThrottler};
//!
//! let throttler: TagThrottler<ReadVersionRequest<u32>> = TagThrottler::new(SystemClock);
//! throttler.update_rates(&HashMap::from([("reports".into(), 2.0)]));
//!
//! for id in 0..5 {
//!     throttler.add_request(ReadVersionRequest::new(Priority::Default, id).tag("reports"));
//! }
//! throttler.add_request(ReadVersionRequest::new(Priority::Batch, 99));
//!
//! let mut batch = VecDeque::new();
//! let mut default = VecDeque::new();
//! let stats = throttler.release_transactions(1.0, &mut batch, &mut default);
//!
//! assert_eq!(stats.tagged_released, 2);
//! assert_eq!(default.len(), 2);
//! assert_eq!(batch.len(), 1);
//! assert_eq!(throttler.queued("reports"), Some(3));
//! ```

// private modules
mod clock;
mod config;
mod epoch;
mod errors;
mod rate_limiter;
mod request;
mod tag_queue;
mod tag_throttler;

// public API exports
pub use clock::{Clock, ClockError, SystemClock};
pub use config::{TagThrottlerConfig, UnknownTagPolicy};
pub use epoch::EpochTimer;
pub use errors::TagThrottlerError;
pub use rate_limiter::{GcraTagLimiter, TagRateLimiter};
pub use request::{Priority, ReadVersionRequest, TaggedRequest, TransactionTag};
pub use tag_queue::{DelayedRequest, LimiterState, QueueRelease, TagQueue};
pub use tag_throttler::{ReleaseStats, TagThrottler};
