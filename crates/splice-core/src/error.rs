//! Error types for Splice.

use thiserror::Error;

/// Main error type for Splice operations.
#[derive(Error, Debug)]
pub enum SpliceError {
    #[error("Grouping error: {0}")]
    Grouping(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Splice operations.
pub type Result<T> = std::result::Result<T, SpliceError>;
