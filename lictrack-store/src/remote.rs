//! Remote data source abstraction.
//!
//! A [`RemoteSource`] performs raw CRUD against the shared relational
//! store. It reports every failure as a [`RemoteError`]; the
//! [`ResilientStore`](crate::ResilientStore) decides what to do with it.

use crate::error::RemoteResult;
use crate::record::Record;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lictrack_types::RecordId;

/// Raw CRUD against the remote store for one record type.
#[async_trait]
pub trait RemoteSource<R: Record>: Send + Sync {
    /// Cheap existence check, used to probe connectivity.
    async fn count(&self) -> RemoteResult<usize>;

    /// Inserts a new record; the remote assigns `id` and timestamps.
    ///
    /// `origin` is the local id the caller falls back to if this call
    /// times out. The remote keeps it with the row so that a later
    /// [`import`](RemoteSource::import) of that local record finds the
    /// row instead of inserting it twice.
    async fn insert(&self, draft: &R::Draft, origin: &RecordId, now: DateTime<Utc>) -> RemoteResult<R>;

    /// Inserts a record created offline, keeping its fields and
    /// timestamps under a remote-assigned id. If a row already carries the
    /// record's id as its origin, that row is returned unchanged.
    async fn import(&self, record: &R) -> RemoteResult<R>;

    /// Returns every record.
    async fn select_all(&self) -> RemoteResult<Vec<R>>;

    /// Returns one record, or `None` if no row has this id.
    async fn select_one(&self, id: &RecordId) -> RemoteResult<Option<R>> {
        Ok(self
            .select_all()
            .await?
            .into_iter()
            .find(|record| record.id() == id))
    }

    /// Replaces the stored row with `record`. `None` if no row has its id.
    async fn update(&self, record: &R) -> RemoteResult<Option<R>>;

    /// Deletes a row. Returns `false` if no row had this id.
    async fn delete(&self, id: &RecordId) -> RemoteResult<bool>;
}

/// An in-memory remote for testing fallback behavior.
pub mod mock {
    use super::*;
    use crate::error::RemoteError;
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Mutex, MutexGuard};
    use std::time::Duration;

    /// Remote operations, for failure injection and call counting.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum RemoteOp {
        Count,
        Insert,
        Import,
        SelectAll,
        SelectOne,
        Update,
        Delete,
    }

    #[derive(Debug)]
    struct MockState<R> {
        rows: Vec<R>,
        /// Origin id to row id.
        origins: HashMap<RecordId, RecordId>,
        next_id: u64,
        unreachable: bool,
        delay: Option<Duration>,
        reply_delay: Option<Duration>,
        queued_failures: HashMap<RemoteOp, VecDeque<RemoteError>>,
        calls: HashMap<RemoteOp, usize>,
    }

    /// An in-memory [`RemoteSource`] with scriptable failures.
    ///
    /// Ids are `remote-<n>` and never reused.
    #[derive(Debug)]
    pub struct MockRemote<R> {
        state: Mutex<MockState<R>>,
    }

    impl<R: Record> Default for MockRemote<R> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<R: Record> MockRemote<R> {
        /// Creates an empty, reachable remote.
        pub fn new() -> Self {
            Self::with_rows(Vec::new())
        }

        /// Creates a reachable remote holding `rows`.
        pub fn with_rows(rows: Vec<R>) -> Self {
            Self {
                state: Mutex::new(MockState {
                    rows,
                    origins: HashMap::new(),
                    next_id: 0,
                    unreachable: false,
                    delay: None,
                    reply_delay: None,
                    queued_failures: HashMap::new(),
                    calls: HashMap::new(),
                }),
            }
        }

        /// Creates a remote that fails every call with a connectivity error.
        pub fn unreachable() -> Self {
            let remote = Self::new();
            remote.set_unreachable(true);
            remote
        }

        fn lock(&self) -> MutexGuard<'_, MockState<R>> {
            self.state.lock().unwrap_or_else(|e| e.into_inner())
        }

        /// Makes every subsequent call fail (or succeed again).
        pub fn set_unreachable(&self, unreachable: bool) {
            self.lock().unreachable = unreachable;
        }

        /// Delays every call, to exercise timeouts.
        pub fn set_delay(&self, delay: Option<Duration>) {
            self.lock().delay = delay;
        }

        /// Delays the answer of inserts and imports after the row is
        /// written, so a timeout loses the reply but not the write.
        pub fn set_reply_delay(&self, delay: Option<Duration>) {
            self.lock().reply_delay = delay;
        }

        /// Queues a one-shot failure for the next call of `op`.
        pub fn fail_next(&self, op: RemoteOp, error: RemoteError) {
            self.lock()
                .queued_failures
                .entry(op)
                .or_default()
                .push_back(error);
        }

        /// Number of calls made for `op`, including failed ones.
        pub fn calls(&self, op: RemoteOp) -> usize {
            self.lock().calls.get(&op).copied().unwrap_or(0)
        }

        /// Snapshot of the stored rows.
        pub fn rows(&self) -> Vec<R> {
            self.lock().rows.clone()
        }

        async fn enter(&self, op: RemoteOp) -> RemoteResult<()> {
            let delay = {
                let mut state = self.lock();
                *state.calls.entry(op).or_default() += 1;
                state.delay
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let mut state = self.lock();
            if let Some(error) = state.queued_failures.get_mut(&op).and_then(VecDeque::pop_front) {
                return Err(error);
            }
            if state.unreachable {
                return Err(RemoteError::Connectivity("connection refused".into()));
            }
            Ok(())
        }

        async fn reply(&self, record: R) -> RemoteResult<R> {
            let delay = self.lock().reply_delay;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Ok(record)
        }

        fn next_id(state: &mut MockState<R>) -> RecordId {
            state.next_id += 1;
            RecordId::new(format!("remote-{}", state.next_id))
        }
    }

    #[async_trait]
    impl<R: Record> RemoteSource<R> for MockRemote<R> {
        async fn count(&self) -> RemoteResult<usize> {
            self.enter(RemoteOp::Count).await?;
            Ok(self.lock().rows.len())
        }

        async fn insert(&self, draft: &R::Draft, origin: &RecordId, now: DateTime<Utc>) -> RemoteResult<R> {
            self.enter(RemoteOp::Insert).await?;
            let record = {
                let mut state = self.lock();
                let id = Self::next_id(&mut state);
                let record = R::from_draft(id.clone(), draft, now);
                state.rows.push(record.clone());
                state.origins.insert(origin.clone(), id);
                record
            };
            self.reply(record).await
        }

        async fn import(&self, record: &R) -> RemoteResult<R> {
            self.enter(RemoteOp::Import).await?;
            let imported = {
                let mut state = self.lock();
                let existing = state
                    .origins
                    .get(record.id())
                    .and_then(|id| state.rows.iter().find(|r| r.id() == id))
                    .cloned();
                match existing {
                    Some(row) => row,
                    None => {
                        let id = Self::next_id(&mut state);
                        let mut value = serde_json::to_value(record)
                            .map_err(|e| RemoteError::Constraint(e.to_string()))?;
                        value["id"] = serde_json::Value::String(id.to_string());
                        let imported: R = serde_json::from_value(value)
                            .map_err(|e| RemoteError::Constraint(e.to_string()))?;
                        state.rows.push(imported.clone());
                        state.origins.insert(record.id().clone(), id);
                        imported
                    }
                }
            };
            self.reply(imported).await
        }

        async fn select_all(&self) -> RemoteResult<Vec<R>> {
            self.enter(RemoteOp::SelectAll).await?;
            Ok(self.lock().rows.clone())
        }

        async fn select_one(&self, id: &RecordId) -> RemoteResult<Option<R>> {
            self.enter(RemoteOp::SelectOne).await?;
            Ok(self.lock().rows.iter().find(|r| r.id() == id).cloned())
        }

        async fn update(&self, record: &R) -> RemoteResult<Option<R>> {
            self.enter(RemoteOp::Update).await?;
            let mut state = self.lock();
            match state.rows.iter_mut().find(|r| r.id() == record.id()) {
                Some(row) => {
                    *row = record.clone();
                    Ok(Some(record.clone()))
                }
                None => Ok(None),
            }
        }

        async fn delete(&self, id: &RecordId) -> RemoteResult<bool> {
            self.enter(RemoteOp::Delete).await?;
            let mut state = self.lock();
            let before = state.rows.len();
            state.rows.retain(|r| r.id() != id);
            Ok(state.rows.len() != before)
        }
    }
}
