// src/bucket.rs

// tokenbucket: a lock-free token bucket driven by a virtual-time watermark.

// dependencies
use crate::clock::{Clock, MonotonicClock};
use crate::config::TokenBucketConfig;
use crate::decision::BucketDecision;
use crate::errors::TokenBucketError;
use crate::pacing::Pacing;
use std::sync::atomic::AtomicU64;
use std::time::Duration;
use tracing::debug;

/// A single token bucket shared by any number of threads.
/// C is the clock type, defaulting to MonotonicClock.
/// All mutable state is one `AtomicU64` updated by compare-and-swap, so the
/// bucket can be shared behind a plain `Arc` or a `&'static`.
#[derive(Debug)]
pub struct TokenBucket<C = MonotonicClock>
where
    C: Clock,
{
    pacing: Pacing,
    watermark: AtomicU64,
    clock: C,
}

impl TokenBucket<MonotonicClock> {
    /// Create a bucket earning `rate` tokens per second that holds at most
    /// `burst_capacity` tokens, timed by a fresh [`MonotonicClock`].
    pub fn new(rate: u64, burst_capacity: u64) -> Result<Self, TokenBucketError> {
        Self::with_config(
            TokenBucketConfig::new(rate, burst_capacity),
            MonotonicClock::new(),
        )
    }
}

impl<C> TokenBucket<C>
where
    C: Clock,
{
    // method to create a new bucket from a config object and a clock
    pub fn with_config(config: TokenBucketConfig, clock: C) -> Result<Self, TokenBucketError> {
        let pacing = Pacing::new(&config)?;
        debug!(
            rate = pacing.rate(),
            burst = pacing.burst(),
            unit_cost = ?pacing.unit_cost(),
            "token bucket created"
        );
        Ok(Self {
            pacing,
            watermark: AtomicU64::new(0),
            clock,
        })
    }

    /// Tokens earned per second
    pub fn rate(&self) -> u64 {
        self.pacing.rate()
    }

    /// Maximum tokens consumable at once after an idle period
    pub fn burst(&self) -> u64 {
        self.pacing.burst()
    }

    /// Time needed to earn one token, after truncation to whole microseconds
    pub fn unit_cost(&self) -> Duration {
        self.pacing.unit_cost()
    }

    /// Consume `tokens` if they are available right now.
    ///
    /// `Ok(true)` means the tokens were taken. `Ok(false)` means there is not
    /// enough capacity and the bucket is untouched. Never blocks; callers
    /// that want to wait implement their own retry loop.
    ///
    /// # Errors
    ///
    /// [`TokenBucketError::TokenOverflow`] if `tokens` is too large to cost
    /// in microseconds, [`TokenBucketError::Clock`] if the clock fails. In both
    /// cases the bucket is untouched.
    pub fn try_consume(&self, tokens: u64) -> Result<bool, TokenBucketError> {
        self.try_acquire(tokens).map(|decision| decision.allowed)
    }

    /// Like [`try_consume`](Self::try_consume), with remaining capacity and a
    /// retry hint.
    pub fn try_acquire(&self, tokens: u64) -> Result<BucketDecision, TokenBucketError> {
        self.pacing.acquire(&self.watermark, tokens, &self.clock)
    }

    /// Whole tokens available right now. Purely a snapshot: another thread
    /// may consume them before the caller acts.
    pub fn available(&self) -> Result<u64, TokenBucketError> {
        self.pacing.available(&self.watermark, &self.clock)
    }

    #[cfg(test)]
    fn watermark(&self) -> u64 {
        self.watermark.load(std::sync::atomic::Ordering::Acquire)
    }
}
