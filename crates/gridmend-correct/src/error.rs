//! Error types for the correction adapter.

use thiserror::Error;

/// Reasons a corrector payload is rejected before it touches the store.
/// Logged at the adapter boundary, never propagated.
#[derive(Debug, Error)]
pub enum CorrectError {
    /// Payload carries no entries at all.
    #[error("unusable correction batch: {reason}")]
    UnusableBatch { reason: String },

    /// Payload was produced against an earlier dataset generation.
    #[error("stale correction batch: payload generation {payload}, store generation {store}")]
    StaleGeneration { payload: u64, store: u64 },
}

/// Result type for correction adapter internals.
pub type Result<T> = std::result::Result<T, CorrectError>;
