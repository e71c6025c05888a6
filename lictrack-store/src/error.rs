//! Error types for the storage layer.

use lictrack_types::{FieldErrors, RecordId};
use std::time::Duration;
use thiserror::Error;

/// Result type for remote adapter calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Result type for local persistence.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by a remote adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// The remote could not be reached or failed mid-operation.
    #[error("remote unreachable: {0}")]
    Connectivity(String),

    /// The remote did not answer within the configured timeout.
    #[error("remote timed out after {0:?}")]
    Timeout(Duration),

    /// The remote rejected the data (unique key, check constraint).
    #[error("constraint violation: {0}")]
    Constraint(String),
}

impl RemoteError {
    /// Returns true if this failure should switch the store offline.
    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_) | Self::Timeout(_))
    }
}

/// Expected failures of a store operation, reported in an `OpResult`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OpError {
    /// The record failed validation; every violated field is listed.
    #[error("validation failed: {}", format_fields(.0))]
    Validation(FieldErrors),

    /// No record with this id exists in the authoritative store.
    #[error("record not found: {0}")]
    NotFound(RecordId),
}

impl OpError {
    /// Short machine-readable kind: `"validation"` or `"not_found"`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
        }
    }

    /// The violated fields, if this is a validation failure.
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::NotFound(_) => None,
        }
    }
}

fn format_fields(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors from the local cache persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
