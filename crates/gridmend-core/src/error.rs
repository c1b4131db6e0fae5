//! Error types for session-level operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// A dataset without columns has no cells to annotate.
    #[error("dataset has no columns")]
    EmptyDataset,
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
