//! Store configuration.

use std::time::Duration;

/// Default timeout for a single remote call.
pub const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 5_000;

/// Tunables for a [`ResilientStore`](crate::ResilientStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Upper bound on any one remote call; exceeding it counts as a
    /// connectivity failure.
    pub remote_timeout_ms: u64,
    /// Create the record type's seed records when the store starts empty.
    pub seed_defaults: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            remote_timeout_ms: DEFAULT_REMOTE_TIMEOUT_MS,
            seed_defaults: true,
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }
}
