//! Clone error types

use thiserror::Error;

use crate::path::ClonePath;

/// Deep clone errors
#[derive(Debug, Error)]
pub enum CloneError {
    /// Strict mode found a function somewhere in the graph
    #[error("Non-copyable value found at path: {path}")]
    NonCopyable {
        /// Where the function was found
        path: ClonePath,
    },

    /// Configuration could not be parsed
    #[error("Invalid clone configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl CloneError {
    /// Path of the offending value, for `NonCopyable`
    pub fn path(&self) -> Option<&ClonePath> {
        match self {
            Self::NonCopyable { path } => Some(path),
            Self::Config(_) => None,
        }
    }
}

/// Result type for clone operations
pub type CloneResult<T> = std::result::Result<T, CloneError>;
