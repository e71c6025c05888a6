//! Error types for expiry configuration.

use thiserror::Error;

/// Errors raised while building a band configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpiryError {
    /// Unrecognized band policy name.
    #[error("unknown band policy: {0}")]
    UnknownPolicy(String),

    /// Band thresholds out of order or negative.
    #[error("invalid band thresholds: {0}")]
    InvalidThresholds(String),
}

/// Result type for expiry configuration.
pub type ExpiryResult<T> = Result<T, ExpiryError>;
