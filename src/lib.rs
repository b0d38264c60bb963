// src/lib.rs

//! # tokenbucket
//!
//! A non-blocking, lock-free token bucket. Each call answers whether N units
//! of work may proceed right now; nothing ever sleeps, queues, or runs on a
//! timer.
//!
//! Instead of counting tokens, a bucket stores one virtual-time watermark in
//! an `AtomicU64` and moves it forward with compare-and-swap. See the
//! [`TokenBucket`] docs for the contract.
//!
//! ## Quick Example
//!
//! ```rust
//! use tokenbucket::TokenBucket;
//!
//! // 100 tokens per second, bursts of up to 10
//! let bucket = TokenBucket::new(100, 10).unwrap();
//!
//! if bucket.try_consume(3).unwrap() {
//!     println!("go ahead");
//! }
//!
//! let decision = bucket.try_acquire(20).unwrap();
//! assert!(!decision.allowed); // larger than the burst, never fits
//! assert!(decision.retry_after.is_none());
//! ```
//!
//! ## Injecting a clock
//!
//! ```rust
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use tokenbucket::{Clock, ClockError, TokenBucket, TokenBucketConfig};
//!
//! struct Frozen(AtomicU64);
//!
//! impl Clock for Frozen {
//!     fn now_micros(&self) -> Result<u64, ClockError> {
//!         Ok(self.0.load(Ordering::Relaxed))
//!     }
//! }
//!
//! let bucket = TokenBucket::with_config(
//!     TokenBucketConfig::new(1, 10),
//!     Frozen(AtomicU64::new(0)),
//! )
//! .unwrap();
//! assert!(bucket.try_consume(10).unwrap());
//! assert!(!bucket.try_consume(1).unwrap());
//! ```

// private modules
mod bucket;
mod clock;
mod config;
mod decision;
mod errors;
mod keyed;
mod pacing;

// public API exports
pub use bucket::TokenBucket;
pub use clock::{Clock, ClockError, MICROS_PER_SECOND, MonotonicClock, SystemClock};
pub use config::TokenBucketConfig;
pub use decision::BucketDecision;
pub use errors::TokenBucketError;
pub use keyed::KeyedTokenBucket;
