//! Feature Error Types

use thiserror::Error;

/// Errors while assembling or interpreting feature vectors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    /// Vector length does not match the schema
    #[error("Feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Month outside 1..=12
    #[error("Invalid calendar month: {0}")]
    InvalidMonth(u32),
}
