//! Field-level validation errors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single violated constraint on a record field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// The field name, as it appears in the serialized record.
    pub field: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every violation found while validating one record.
pub type FieldErrors = Vec<FieldError>;

/// Converts a list of errors into `Ok(())` when empty.
pub(crate) fn into_result(errors: FieldErrors) -> Result<(), FieldErrors> {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Trims `value` and cuts it to at most `max_chars` characters.
pub(crate) fn sanitize(value: &str, max_chars: usize) -> String {
    value.trim().chars().take(max_chars).collect()
}
