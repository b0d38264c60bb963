// src/clock.rs

// clock module definition and implementations

// dependencies
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Ticks per second of every [`Clock`]: buckets work in microseconds.
pub const MICROS_PER_SECOND: u64 = 1_000_000;

/// Clock trait to abstract time retrieval.
/// Implementors must be thread-safe (Send + Sync) and should never go
/// backwards; a clock that does only delays admissions, it never over-admits.
/// The `now_micros` method returns the current time in microseconds since an
/// arbitrary, fixed epoch.
pub trait Clock: Send + Sync {
    fn now_micros(&self) -> Result<u64, ClockError>;
}

/// Clock error type
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    #[error("system time is before the Unix epoch")]
    SystemTimeError,
}

/// Monotonic clock counting microseconds since it was created.
/// This is the default clock of [`crate::TokenBucket::new`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_micros(&self) -> Result<u64, ClockError> {
        Ok(saturating_micros(self.origin.elapsed()))
    }
}

/// Wall-clock time in microseconds since the Unix epoch.
/// Subject to clock adjustments; prefer [`MonotonicClock`] unless several
/// processes need to agree on the epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_micros(&self) -> Result<u64, ClockError> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(saturating_micros)
            .map_err(|_| ClockError::SystemTimeError)
    }
}

// Clamp instead of truncating; u64 microseconds cover ~584k years
pub(crate) fn saturating_micros(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_micros(&self) -> Result<u64, ClockError> {
        (**self).now_micros()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now_micros(&self) -> Result<u64, ClockError> {
        (**self).now_micros()
    }
}
