//! Error types for the sizing engine.

use thiserror::Error;

/// Errors raised by engine operations.
///
/// Incomplete sizing parameters and a non-positive loss per lot are not errors;
/// they produce an all-zero [`SizingResult`](crate::SizingResult) instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizerError {
    /// An observation was rejected before touching the history.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience alias for engine results.
pub type Result<T> = std::result::Result<T, SizerError>;
