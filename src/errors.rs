// src/errors.rs

// error handling for the token bucket types

// dependencies
use crate::clock::ClockError;

/// Error type for token bucket construction and decisions.
///
/// Running out of capacity is not an error: it is reported as a denied
/// decision.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenBucketError {
    /// Rate or burst cannot describe a usable bucket.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: &'static str },

    /// The time cost of the requested tokens does not fit in 64 bits.
    #[error("cost of {tokens} tokens overflows the time budget")]
    TokenOverflow { tokens: u64 },

    #[error("clock error: {0}")]
    Clock(#[from] ClockError),
}

impl TokenBucketError {
    pub(crate) fn invalid(reason: &'static str) -> Self {
        Self::InvalidConfiguration { reason }
    }
}
