// src/decision.rs

// dependencies
use std::time::Duration;

/// Result of a token bucket decision with metadata for callers that back off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketDecision {
    /// Whether the tokens were consumed
    pub allowed: bool,
    /// Whole tokens still available right after this decision
    pub remaining_tokens: u64,
    /// How long until the same request would fit, if nobody else consumes.
    /// `None` when allowed, or when the request exceeds the burst capacity
    /// and can never fit.
    pub retry_after: Option<Duration>,
}

impl BucketDecision {
    pub(crate) fn allowed(remaining_tokens: u64) -> Self {
        Self {
            allowed: true,
            remaining_tokens,
            retry_after: None,
        }
    }

    pub(crate) fn denied(remaining_tokens: u64, retry_after: Option<Duration>) -> Self {
        Self {
            allowed: false,
            remaining_tokens,
            retry_after,
        }
    }
}
