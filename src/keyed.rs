// src/keyed.rs

// one watermark per key, sharing rate, burst and clock

// dependencies
use crate::clock::{Clock, MonotonicClock};
use crate::config::TokenBucketConfig;
use crate::decision::BucketDecision;
use crate::errors::TokenBucketError;
use crate::pacing::Pacing;
use dashmap::DashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// A family of token buckets, one per key.
/// K is the type used to identify callers (e.g., String, IpAddr, u64).
/// C is the clock type, defaulting to MonotonicClock.
/// Buckets are created on first use and start full. The map only guards
/// lookup; each decision is the same CAS loop as [`crate::TokenBucket`].
#[derive(Debug)]
pub struct KeyedTokenBucket<K, C = MonotonicClock>
where
    K: Hash + Eq + Clone,
    C: Clock,
{
    pacing: Pacing,
    watermarks: DashMap<K, AtomicU64>,
    clock: C,
}

impl<K> KeyedTokenBucket<K, MonotonicClock>
where
    K: Hash + Eq + Clone,
{
    pub fn new(rate: u64, burst_capacity: u64) -> Result<Self, TokenBucketError> {
        Self::with_config(
            TokenBucketConfig::new(rate, burst_capacity),
            MonotonicClock::new(),
        )
    }
}

impl<K, C> KeyedTokenBucket<K, C>
where
    K: Hash + Eq + Clone,
    C: Clock,
{
    pub fn with_config(config: TokenBucketConfig, clock: C) -> Result<Self, TokenBucketError> {
        let pacing = Pacing::new(&config)?;
        debug!(
            rate = pacing.rate(),
            burst = pacing.burst(),
            unit_cost = ?pacing.unit_cost(),
            "keyed token bucket created"
        );
        Ok(Self {
            pacing,
            watermarks: DashMap::new(),
            clock,
        })
    }

    pub fn rate(&self) -> u64 {
        self.pacing.rate()
    }

    pub fn burst(&self) -> u64 {
        self.pacing.burst()
    }

    /// Number of keys currently tracked
    pub fn len(&self) -> usize {
        self.watermarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watermarks.is_empty()
    }

    /// Consume `tokens` from `key`'s bucket if available right now.
    /// Same contract as [`crate::TokenBucket::try_consume`].
    pub fn try_consume(&self, key: K, tokens: u64) -> Result<bool, TokenBucketError> {
        self.try_acquire(key, tokens).map(|decision| decision.allowed)
    }

    pub fn try_acquire(&self, key: K, tokens: u64) -> Result<BucketDecision, TokenBucketError> {
        if let Some(cell) = self.watermarks.get(&key) {
            return self.pacing.acquire(cell.value(), tokens, &self.clock);
        }
        let cell = self
            .watermarks
            .entry(key)
            .or_insert_with(|| AtomicU64::new(0))
            .downgrade();
        self.pacing.acquire(cell.value(), tokens, &self.clock)
    }

    /// Whole tokens available to `key` right now. Unknown keys report a full
    /// bucket and are not inserted.
    pub fn available(&self, key: &K) -> Result<u64, TokenBucketError> {
        match self.watermarks.get(key) {
            Some(cell) => self.pacing.available(cell.value(), &self.clock),
            None => self.pacing.available(&AtomicU64::new(0), &self.clock),
        }
    }

    /// Forget keys whose bucket has been full for at least `idle`.
    ///
    /// A forgotten key behaves exactly like one that was never seen, so this
    /// only reclaims memory. Returns how many keys were removed; on a clock
    /// error nothing is removed.
    pub fn cleanup_idle_keys(&self, idle: Duration) -> Result<usize, TokenBucketError> {
        let now = self.pacing.now(&self.clock)?;
        let mut removed = 0;
        self.watermarks.retain(|_, cell| {
            let stale = self.pacing.is_idle(cell.load(Ordering::Acquire), now, idle);
            removed += usize::from(stale);
            !stale
        });
        debug!(removed, remaining = self.watermarks.len(), "cleaned up idle keys");
        Ok(removed)
    }
}
