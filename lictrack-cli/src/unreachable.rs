use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lictrack_store::{Record, RemoteError, RemoteResult, RemoteSource};
use lictrack_types::RecordId;

/// Stand-in remote for a database that could not be opened. Every call
/// fails with a connectivity error, so stores start offline.
#[derive(Debug, Clone)]
pub struct Unreachable {
    reason: String,
}

impl Unreachable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    fn error(&self) -> RemoteError {
        RemoteError::Connectivity(self.reason.clone())
    }
}

#[async_trait]
impl<R: Record> RemoteSource<R> for Unreachable {
    async fn count(&self) -> RemoteResult<usize> {
        Err(self.error())
    }

    async fn insert(&self, _draft: &R::Draft, _origin: &RecordId, _now: DateTime<Utc>) -> RemoteResult<R> {
        Err(self.error())
    }

    async fn import(&self, _record: &R) -> RemoteResult<R> {
        Err(self.error())
    }

    async fn select_all(&self) -> RemoteResult<Vec<R>> {
        Err(self.error())
    }

    async fn update(&self, _record: &R) -> RemoteResult<Option<R>> {
        Err(self.error())
    }

    async fn delete(&self, _id: &RecordId) -> RemoteResult<bool> {
        Err(self.error())
    }
}
