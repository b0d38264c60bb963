// src/pacing.rs

//! Watermark arithmetic shared by [`crate::TokenBucket`] and
//! [`crate::KeyedTokenBucket`].
//!
//! A bucket does not count tokens. It keeps a single virtual-time
//! watermark: the instant up to which consumed tokens have been paid for.
//! Consuming `n` tokens pushes the watermark forward by `n * unit_cost`, and
//! is only allowed if the watermark stays at or behind `now`. Idle time
//! earns credit, capped at `burst_window` by never letting the watermark
//! lag `now` by more than that.
//!
//! ```text
//!   now - burst_window          watermark            now
//!   |---------------------------|--------------------|
//!                                  available = (now - watermark) / unit_cost
//! ```
//!
//! Clock readings are shifted forward by `burst_window` before use, so the
//! floor `now - burst_window` never underflows and a zero watermark means
//! "full bucket" no matter where the clock starts.

// dependencies
use crate::clock::{Clock, saturating_micros};
use crate::config::TokenBucketConfig;
use crate::decision::BucketDecision;
use crate::errors::TokenBucketError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{trace, warn};

/// Immutable parameters derived from a validated config.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Pacing {
    rate: u64,
    burst: u64,
    unit_cost_micros: u64,
    burst_window_micros: u64,
}

impl Pacing {
    pub(crate) fn new(config: &TokenBucketConfig) -> Result<Self, TokenBucketError> {
        config.validate()?;
        let unit_cost_micros = config.unit_cost_micros();
        if config.is_lossy() {
            warn!(
                rate = config.rate_per_second,
                unit_cost_micros,
                "rate does not divide one second evenly; tokens are earned slightly faster"
            );
        }
        Ok(Self {
            rate: config.rate_per_second,
            burst: config.burst_capacity,
            unit_cost_micros,
            // validate() has already bounded this product
            burst_window_micros: config.burst_capacity * unit_cost_micros,
        })
    }

    pub(crate) fn rate(&self) -> u64 {
        self.rate
    }

    pub(crate) fn burst(&self) -> u64 {
        self.burst
    }

    pub(crate) fn unit_cost(&self) -> Duration {
        Duration::from_micros(self.unit_cost_micros)
    }

    /// Current clock reading on the shifted axis.
    pub(crate) fn now<C: Clock>(&self, clock: &C) -> Result<u64, TokenBucketError> {
        Ok(clock.now_micros()?.saturating_add(self.burst_window_micros))
    }

    fn floor(&self, now: u64) -> u64 {
        now - self.burst_window_micros
    }

    fn whole_tokens(&self, micros: u64) -> u64 {
        micros / self.unit_cost_micros
    }

    /// Attempt to consume `tokens` from the bucket whose watermark is `cell`.
    ///
    /// Either commits with one successful CAS or returns a denial without
    /// writing. Zero tokens are admitted without writing. The clock is
    /// re-read after every lost CAS.
    pub(crate) fn acquire<C: Clock>(
        &self,
        cell: &AtomicU64,
        tokens: u64,
        clock: &C,
    ) -> Result<BucketDecision, TokenBucketError> {
        let debt = tokens
            .checked_mul(self.unit_cost_micros)
            .ok_or(TokenBucketError::TokenOverflow { tokens })?;

        let mut old = cell.load(Ordering::Acquire);
        let mut retries: u32 = 0;
        loop {
            let now = self.now(clock)?;
            let effective = old.max(self.floor(now));

            // Nothing to pay: admit without writing, even if the clock
            // has stepped back behind the watermark.
            if debt == 0 {
                let remaining = self.whole_tokens(now.saturating_sub(effective));
                return Ok(BucketDecision::allowed(remaining));
            }

            let candidate = effective.saturating_add(debt);

            if candidate > now {
                let remaining = self.whole_tokens(now.saturating_sub(effective));
                let retry_after = (debt <= self.burst_window_micros)
                    .then(|| Duration::from_micros(candidate - now));
                return Ok(BucketDecision::denied(remaining, retry_after));
            }

            match cell.compare_exchange_weak(old, candidate, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => {
                    return Ok(BucketDecision::allowed(self.whole_tokens(now - candidate)));
                }
                Err(actual) => {
                    retries += 1;
                    trace!(retries, tokens, "watermark contended, retrying");
                    old = actual;
                }
            }
        }
    }

    /// Whole tokens available in the bucket right now, without consuming.
    pub(crate) fn available<C: Clock>(
        &self,
        cell: &AtomicU64,
        clock: &C,
    ) -> Result<u64, TokenBucketError> {
        let now = self.now(clock)?;
        let effective = cell.load(Ordering::Acquire).max(self.floor(now));
        Ok(self.whole_tokens(now.saturating_sub(effective)))
    }

    /// Whether a watermark has sat at or below the floor for at least `idle`
    /// as of shifted time `now`, i.e. the bucket has been full that long.
    pub(crate) fn is_idle(&self, watermark: u64, now: u64, idle: Duration) -> bool {
        watermark.saturating_add(saturating_micros(idle)) <= self.floor(now)
    }
}
