// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for candle-table-bias.

/// Errors that can occur while computing positional buckets.
#[derive(Debug, thiserror::Error)]
pub enum BucketError {
    /// Tensor operation error (wraps candle).
    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    /// Input shape precondition violation (rank or length mismatch).
    #[error("shape error: {0}")]
    Shape(String),

    /// Invalid bucket configuration or config parsing error.
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for candle-table-bias operations.
pub type Result<T> = std::result::Result<T, BucketError>;
