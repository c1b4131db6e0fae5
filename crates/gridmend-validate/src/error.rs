//! Error types for the validation adapter.

use thiserror::Error;

/// Reasons a validator payload is rejected before it ever touches the
/// store. These are logged at the adapter boundary, never propagated.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// Payload has an unusable shape: empty, or no status column matching
    /// a dataset column.
    #[error("unusable validation result: {reason}")]
    UnusableResult { reason: String },

    /// Payload was produced against an earlier dataset generation and its
    /// keys are no longer meaningful.
    #[error("stale validation result: payload generation {payload}, store generation {store}")]
    StaleGeneration { payload: u64, store: u64 },
}

/// Result type for validation adapter internals.
pub type Result<T> = std::result::Result<T, ValidateError>;
