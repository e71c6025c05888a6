//! Operation outcomes returned by the store.

use crate::error::OpError;
use lictrack_types::FieldErrors;
use serde::Serialize;

/// The outcome of a store operation.
///
/// `used_fallback` is set whenever the offline cache served the call,
/// including the call that triggered the switch to offline mode.
#[derive(Debug, Clone, PartialEq)]
pub struct OpResult<T> {
    pub outcome: Result<T, OpError>,
    pub used_fallback: bool,
}

impl<T> OpResult<T> {
    pub fn ok(data: T, used_fallback: bool) -> Self {
        Self {
            outcome: Ok(data),
            used_fallback,
        }
    }

    pub fn failed(error: OpError, used_fallback: bool) -> Self {
        Self {
            outcome: Err(error),
            used_fallback,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    #[must_use]
    pub fn data(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    pub fn into_data(self) -> Option<T> {
        self.outcome.ok()
    }

    #[must_use]
    pub fn error(&self) -> Option<&OpError> {
        self.outcome.as_ref().err()
    }

    /// `"validation"` or `"not_found"` for failures.
    #[must_use]
    pub fn error_kind(&self) -> Option<&'static str> {
        self.error().map(OpError::kind)
    }

    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        self.error().and_then(OpError::field_errors)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> OpResult<U> {
        OpResult {
            outcome: self.outcome.map(f),
            used_fallback: self.used_fallback,
        }
    }
}

/// What happened during [`ResilientStore`](crate::ResilientStore) startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InitReport {
    pub online: bool,
    pub record_count: usize,
    /// Number of default records created because the store was empty.
    pub seeded: usize,
}

/// Connectivity snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStatus {
    pub online: bool,
    pub record_count: usize,
    /// Offline changes not yet pushed to the remote.
    pub pending_sync: usize,
}

/// Outcome of a reconnect attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub synced: usize,
    pub failed: usize,
    pub online: bool,
}
