//! Value-model error types

use thiserror::Error;

/// Errors raised by value construction and conversion
#[derive(Debug, Error)]
pub enum ValueError {
    /// Type error (e.g., serializing a BigInt)
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Range error (e.g., typed array view out of bounds)
    #[error("RangeError: {0}")]
    RangeError(String),

    /// A cycle was found while converting to JSON
    #[error("TypeError: Converting circular structure to JSON (at {0})")]
    CircularJson(String),

    /// A date string could not be parsed
    #[error("RangeError: Invalid time value: {0:?}")]
    InvalidDate(String),
}

impl ValueError {
    /// Create a type error
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::TypeError(msg.into())
    }

    /// Create a range error
    pub fn range_error(msg: impl Into<String>) -> Self {
        Self::RangeError(msg.into())
    }
}

/// Result type for value operations
pub type ValueResult<T> = std::result::Result<T, ValueError>;
