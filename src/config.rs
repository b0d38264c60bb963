// src/config.rs

//! Configuration types for token buckets

// dependencies
use crate::clock::MICROS_PER_SECOND;
use crate::errors::TokenBucketError;

/// Largest burst window accepted, so that shifting a clock reading by the
/// window cannot overflow for any realistic clock.
const MAX_BURST_WINDOW_MICROS: u64 = u64::MAX / 2;

/// Configuration for token bucket behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBucketConfig {
    pub(crate) rate_per_second: u64,
    pub(crate) burst_capacity: u64,
}

impl TokenBucketConfig {
    /// Create a new configuration with rate and burst settings
    pub fn new(rate_per_second: u64, burst_capacity: u64) -> Self {
        Self {
            rate_per_second,
            burst_capacity,
        }
    }

    /// Builder-style: set rate per second
    pub fn rate(mut self, rate_per_second: u64) -> Self {
        self.rate_per_second = rate_per_second;
        self
    }

    /// Builder-style: set burst capacity
    pub fn burst(mut self, burst_capacity: u64) -> Self {
        self.burst_capacity = burst_capacity;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), TokenBucketError> {
        if self.rate_per_second == 0 {
            return Err(TokenBucketError::invalid("rate must be positive"));
        }
        if self.rate_per_second > MICROS_PER_SECOND {
            return Err(TokenBucketError::invalid(
                "rate must not exceed one token per microsecond",
            ));
        }
        if self.burst_capacity == 0 {
            return Err(TokenBucketError::invalid("burst capacity must be positive"));
        }
        match self.burst_capacity.checked_mul(self.unit_cost_micros()) {
            Some(window) if window <= MAX_BURST_WINDOW_MICROS => Ok(()),
            _ => Err(TokenBucketError::invalid("burst window is too large")),
        }
    }

    /// Time needed to earn one token. Truncates when the rate does not
    /// divide one million.
    pub(crate) fn unit_cost_micros(&self) -> u64 {
        MICROS_PER_SECOND / self.rate_per_second
    }

    pub(crate) fn is_lossy(&self) -> bool {
        MICROS_PER_SECOND % self.rate_per_second != 0
    }
}
