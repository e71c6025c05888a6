//! The resilient store: remote CRUD with transparent offline fallback.

use crate::cache::{CacheSnapshot, LocalCache};
use crate::config::StoreConfig;
use crate::error::{OpError, RemoteError, RemoteResult};
use crate::persist::CachePersistence;
use crate::record::Record;
use crate::remote::RemoteSource;
use crate::result::{InitReport, OpResult, StoreStatus, SyncReport};
use lictrack_types::{Clock, FieldError, RecordId, SystemClock};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Which side is authoritative for the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    Online,
    Offline,
}

impl StoreMode {
    #[must_use]
    pub fn is_online(self) -> bool {
        self == Self::Online
    }
}

impl fmt::Display for StoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Online => "online",
            Self::Offline => "offline",
        })
    }
}

/// Configures and initializes a [`ResilientStore`].
pub struct StoreBuilder<R: Record> {
    remote: Arc<dyn RemoteSource<R>>,
    config: StoreConfig,
    clock: Arc<dyn Clock>,
    persistence: Option<Arc<dyn CachePersistence<R>>>,
}

impl<R: Record> StoreBuilder<R> {
    #[must_use]
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Keeps the offline cache across sessions.
    #[must_use]
    pub fn persistence(mut self, persistence: impl CachePersistence<R> + 'static) -> Self {
        self.persistence = Some(Arc::new(persistence));
        self
    }

    /// Probes the remote and returns a ready store.
    ///
    /// A reachable remote makes the store `Online`, after replaying any
    /// journal left by a previous offline session. Otherwise the store
    /// starts `Offline` on the persisted cache (or an empty one). Seed
    /// records are then created if the authoritative set is empty.
    pub async fn init(self) -> (ResilientStore<R>, InitReport) {
        let snapshot = match &self.persistence {
            Some(persistence) => persistence.load().unwrap_or_else(|e| {
                warn!("ignoring unreadable {} cache: {}", R::KIND, e);
                CacheSnapshot::default()
            }),
            None => CacheSnapshot::default(),
        };

        let store = ResilientStore {
            remote: self.remote,
            clock: self.clock,
            config: self.config,
            persistence: self.persistence,
            cache: Mutex::new(LocalCache::restore(snapshot)),
            online: AtomicBool::new(false),
            record_count: AtomicUsize::new(0),
            pending_sync: AtomicUsize::new(0),
        };

        let mut cache = store.cache.lock().await;
        let online = match store.remote_call(store.remote.count()).await {
            Ok(count) => {
                debug!("{} remote reachable, {} row(s)", R::KIND, count);
                let report = store.sync_locked(&mut cache).await;
                if report.synced > 0 {
                    info!("pushed {} offline {} change(s)", report.synced, R::KIND);
                }
                if !report.online {
                    warn!("{} remote did not accept the offline journal, starting offline", R::KIND);
                }
                report.online
            }
            Err(e) => {
                warn!("{} remote unreachable, starting offline: {}", R::KIND, e);
                false
            }
        };
        store.online.store(online, Ordering::Release);
        store.commit(&cache);

        let seeded = if store.config.seed_defaults {
            store.seed_locked(&mut cache).await
        } else {
            0
        };
        drop(cache);

        let status = store.status();
        info!(
            "{} store ready ({}, {} record(s))",
            R::KIND,
            store.mode(),
            status.record_count
        );
        let report = InitReport {
            online: status.online,
            record_count: status.record_count,
            seeded,
        };
        (store, report)
    }
}

/// CRUD over one record type with online to offline fallback.
///
/// Every operation holds the store's lock for its whole duration, so the
/// mode flag, the remote call and the cache mutation are never interleaved
/// with another caller. Expected failures come back as [`OpResult`] values.
pub struct ResilientStore<R: Record> {
    remote: Arc<dyn RemoteSource<R>>,
    clock: Arc<dyn Clock>,
    config: StoreConfig,
    persistence: Option<Arc<dyn CachePersistence<R>>>,
    cache: Mutex<LocalCache<R>>,
    online: AtomicBool,
    record_count: AtomicUsize,
    pending_sync: AtomicUsize,
}

impl<R: Record> ResilientStore<R> {
    /// Starts configuring a store over `remote`.
    pub fn builder<S: RemoteSource<R> + 'static>(remote: Arc<S>) -> StoreBuilder<R> {
        StoreBuilder {
            remote,
            config: StoreConfig::default(),
            clock: Arc::new(SystemClock),
            persistence: None,
        }
    }

    /// Initializes a store with the system clock and no persistence.
    pub async fn init<S: RemoteSource<R> + 'static>(remote: Arc<S>, config: StoreConfig) -> (Self, InitReport) {
        Self::builder(remote).config(config).init().await
    }

    #[must_use]
    pub fn mode(&self) -> StoreMode {
        if self.online.load(Ordering::Acquire) {
            StoreMode::Online
        } else {
            StoreMode::Offline
        }
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Connectivity snapshot. Reflects the last completed operation.
    #[must_use]
    pub fn status(&self) -> StoreStatus {
        StoreStatus {
            online: self.online.load(Ordering::Acquire),
            record_count: self.record_count.load(Ordering::Acquire),
            pending_sync: self.pending_sync.load(Ordering::Acquire),
        }
    }

    // ── Operations ──────────────────────────────────────────────────

    /// Validates and stores a new record.
    pub async fn create(&self, draft: R::Draft) -> OpResult<R> {
        let mut cache = self.cache.lock().await;
        self.create_locked(&mut cache, draft, false).await
    }

    /// Returns every record from the authoritative side. Never fails.
    pub async fn get_all(&self) -> OpResult<Vec<R>> {
        let mut cache = self.cache.lock().await;
        if self.is_online() {
            match self.remote_call(self.remote.select_all()).await {
                Ok(records) => {
                    cache.replace_all(records.clone());
                    self.commit(&cache);
                    return OpResult::ok(records, false);
                }
                Err(e) => self.go_offline("select_all", &e),
            }
        }
        OpResult::ok(cache.records().to_vec(), true)
    }

    pub async fn get(&self, id: &RecordId) -> OpResult<R> {
        let mut cache = self.cache.lock().await;
        if self.is_online() {
            match self.remote_call(self.remote.select_one(id)).await {
                Ok(Some(record)) => {
                    cache.upsert(record.clone());
                    self.commit(&cache);
                    return OpResult::ok(record, false);
                }
                Ok(None) => return OpResult::failed(OpError::NotFound(id.clone()), false),
                Err(e) => self.go_offline("select_one", &e),
            }
        }
        match cache.find(id) {
            Some(record) => OpResult::ok(record.clone(), true),
            None => OpResult::failed(OpError::NotFound(id.clone()), true),
        }
    }

    /// Applies a patch. The merged record is validated, `updated_at` is
    /// refreshed, and `id` / `created_at` are kept.
    pub async fn update(&self, id: &RecordId, patch: R::Patch) -> OpResult<R> {
        let mut cache = self.cache.lock().await;
        if self.is_online() {
            match self.update_remote(&mut cache, id, &patch).await {
                Ok(result) => return result,
                Err(e) if e.is_connectivity() => self.go_offline("update", &e),
                Err(e) => return OpResult::failed(rejected::<R>(e), false),
            }
        }

        let updated = match cache.find(id) {
            Some(current) => current.patched(&patch, self.clock.now()),
            None => return OpResult::failed(OpError::NotFound(id.clone()), true),
        };
        match updated {
            Ok(record) => {
                cache.upsert(record.clone());
                cache.mark_dirty(id);
                self.commit(&cache);
                debug!("updated {} {} offline", R::KIND, id);
                OpResult::ok(record, true)
            }
            Err(errors) => OpResult::failed(OpError::Validation(errors), true),
        }
    }

    /// Removes a record. An absent id is reported as not found.
    pub async fn delete(&self, id: &RecordId) -> OpResult<()> {
        let mut cache = self.cache.lock().await;
        if self.is_online() {
            match self.remote_call(self.remote.delete(id)).await {
                Ok(true) => {
                    cache.remove(id);
                    self.commit(&cache);
                    return OpResult::ok((), false);
                }
                Ok(false) => return OpResult::failed(OpError::NotFound(id.clone()), false),
                Err(e) if e.is_connectivity() => self.go_offline("delete", &e),
                Err(e) => return OpResult::failed(rejected::<R>(e), false),
            }
        }

        if cache.remove(id).is_none() {
            return OpResult::failed(OpError::NotFound(id.clone()), true);
        }
        cache.mark_deleted(id);
        self.commit(&cache);
        debug!("deleted {} {} offline", R::KIND, id);
        OpResult::ok((), true)
    }

    /// Tries to leave offline mode, pushing offline changes first.
    ///
    /// The store goes back online only if every pending change was
    /// accepted. Calling this while online is a no-op.
    pub async fn reconnect(&self) -> SyncReport {
        let mut cache = self.cache.lock().await;
        if self.is_online() {
            return SyncReport {
                online: true,
                ..SyncReport::default()
            };
        }

        if let Err(e) = self.remote_call(self.remote.count()).await {
            debug!("{} remote still unreachable: {}", R::KIND, e);
            return SyncReport::default();
        }

        let report = self.sync_locked(&mut cache).await;
        if report.online {
            self.online.store(true, Ordering::Release);
            info!("{} store back online, {} change(s) synced", R::KIND, report.synced);
            if self.config.seed_defaults {
                self.seed_locked(&mut cache).await;
            }
        } else {
            warn!(
                "{} sync incomplete ({} synced, {} failed), staying offline",
                R::KIND,
                report.synced,
                report.failed
            );
        }
        self.commit(&cache);
        report
    }

    // ── Internals ───────────────────────────────────────────────────

    fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    async fn remote_call<T>(&self, call: impl Future<Output = RemoteResult<T>>) -> RemoteResult<T> {
        let limit = self.config.remote_timeout();
        tokio::time::timeout(limit, call)
            .await
            .unwrap_or_else(|_| Err(RemoteError::Timeout(limit)))
    }

    fn go_offline(&self, op: &str, error: &RemoteError) {
        if self.online.swap(false, Ordering::AcqRel) {
            warn!("{} remote {} failed, switching to offline mode: {}", R::KIND, op, error);
        }
    }

    /// Publishes counters and saves the cache if persistence is configured.
    fn commit(&self, cache: &LocalCache<R>) {
        self.record_count.store(cache.len(), Ordering::Release);
        self.pending_sync.store(cache.pending_sync(), Ordering::Release);
        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.save(&cache.snapshot()) {
                warn!("failed to persist {} cache: {}", R::KIND, e);
            }
        }
    }

    async fn create_locked(&self, cache: &mut LocalCache<R>, draft: R::Draft, seed: bool) -> OpResult<R> {
        if let Err(errors) = R::validate_draft(&draft) {
            return OpResult::failed(OpError::Validation(errors), false);
        }
        if let Some(conflict) = cache.records().iter().find_map(|r| R::draft_conflict(&draft, r)) {
            return OpResult::failed(OpError::Validation(vec![conflict]), false);
        }

        // Also the row's origin remotely, so a fallback record built from a
        // timed-out insert imports as that same row.
        let id = cache.next_id();
        if self.is_online() {
            match self.remote_call(self.remote.insert(&draft, &id, self.clock.now())).await {
                Ok(record) => {
                    cache.insert(record.clone());
                    self.commit(cache);
                    debug!("created {} {}", R::KIND, record.id());
                    return OpResult::ok(record, false);
                }
                Err(e) if e.is_connectivity() => self.go_offline("insert", &e),
                Err(e) => return OpResult::failed(rejected::<R>(e), false),
            }
        }

        let record = R::from_draft(id.clone(), &draft, self.clock.now());
        cache.insert(record.clone());
        if seed {
            cache.mark_seeded(&id);
        }
        self.commit(cache);
        debug!("created {} {} offline", R::KIND, id);
        OpResult::ok(record, true)
    }

    async fn update_remote(
        &self,
        cache: &mut LocalCache<R>,
        id: &RecordId,
        patch: &R::Patch,
    ) -> RemoteResult<OpResult<R>> {
        let Some(current) = self.remote_call(self.remote.select_one(id)).await? else {
            return Ok(OpResult::failed(OpError::NotFound(id.clone()), false));
        };
        let updated = match current.patched(patch, self.clock.now()) {
            Ok(record) => record,
            Err(errors) => return Ok(OpResult::failed(OpError::Validation(errors), false)),
        };
        match self.remote_call(self.remote.update(&updated)).await? {
            Some(stored) => {
                cache.upsert(stored.clone());
                self.commit(cache);
                debug!("updated {} {}", R::KIND, id);
                Ok(OpResult::ok(stored, false))
            }
            None => Ok(OpResult::failed(OpError::NotFound(id.clone()), false)),
        }
    }

    async fn seed_locked(&self, cache: &mut LocalCache<R>) -> usize {
        if cache.len() > 0 {
            return 0;
        }
        let mut seeded = 0;
        for draft in R::seed_drafts() {
            let result = self.create_locked(cache, draft, true).await;
            match result.error() {
                None => seeded += 1,
                Some(e) => warn!("could not create default {}: {}", R::KIND, e),
            }
        }
        if seeded > 0 {
            info!("created {} default {}(s)", seeded, R::KIND);
        }
        seeded
    }

    /// Replays the offline journal against a reachable remote, then
    /// refreshes the cache. Stops at the first connectivity failure.
    async fn sync_locked(&self, cache: &mut LocalCache<R>) -> SyncReport {
        let mut report = SyncReport::default();

        for record in cache.offline_created() {
            match self.remote_call(self.remote.import(&record)).await {
                Ok(imported) => {
                    debug!("pushed {} {} as {}", R::KIND, record.id(), imported.id());
                    cache.remove(record.id());
                    cache.insert(imported);
                    report.synced += 1;
                }
                Err(e) if e.is_connectivity() => {
                    warn!("sync interrupted: {}", e);
                    return report;
                }
                Err(e) => {
                    warn!("remote rejected offline {} {}: {}", R::KIND, record.id(), e);
                    report.failed += 1;
                }
            }
        }

        let dirty: Vec<RecordId> = cache.dirty().iter().cloned().collect();
        let mut listing = None;
        for id in dirty {
            let Some(record) = cache.find(&id).cloned() else {
                cache.clear_dirty(&id);
                continue;
            };
            let pushed = if id.is_local() {
                self.push_edited_seed(&record, &mut listing).await
            } else {
                self.remote_call(self.remote.update(&record)).await
            };
            match pushed {
                Ok(Some(_)) => {
                    cache.clear_dirty(&id);
                    report.synced += 1;
                }
                Ok(None) => {
                    warn!("{} {} was deleted remotely, dropping offline changes", R::KIND, id);
                    cache.clear_dirty(&id);
                }
                Err(e) if e.is_connectivity() => {
                    warn!("sync interrupted: {}", e);
                    return report;
                }
                Err(e) => {
                    warn!("remote rejected offline update of {} {}: {}", R::KIND, id, e);
                    report.failed += 1;
                }
            }
        }

        for id in cache.tombstones().to_vec() {
            match self.remote_call(self.remote.delete(&id)).await {
                Ok(_) => {
                    cache.clear_tombstone(&id);
                    report.synced += 1;
                }
                Err(e) if e.is_connectivity() => {
                    warn!("sync interrupted: {}", e);
                    return report;
                }
                Err(e) => {
                    warn!("remote rejected offline delete of {} {}: {}", R::KIND, id, e);
                    report.failed += 1;
                }
            }
        }

        if report.failed > 0 {
            return report;
        }
        match self.remote_call(self.remote.select_all()).await {
            Ok(records) => {
                cache.reset_from_remote(records);
                report.online = true;
            }
            Err(e) => warn!("could not refresh {} cache: {}", R::KIND, e),
        }
        report
    }

    /// Pushes a default record edited offline. It replaces the remote's own
    /// copy of the same entity if there is one, else it is imported.
    async fn push_edited_seed(&self, record: &R, listing: &mut Option<Vec<R>>) -> RemoteResult<Option<R>> {
        if listing.is_none() {
            *listing = Some(self.remote_call(self.remote.select_all()).await?);
        }
        let rows = listing.as_deref().unwrap_or_default();
        match rows.iter().find(|row| record.same_entity(row)) {
            Some(existing) => {
                let merged = record.rekeyed(existing);
                debug!("merging offline {} {} into {}", R::KIND, record.id(), existing.id());
                self.remote_call(self.remote.update(&merged)).await
            }
            None => self.remote_call(self.remote.import(record)).await.map(Some),
        }
    }
}

/// A remote rejection of the data, reported against the record kind.
fn rejected<R: Record>(error: RemoteError) -> OpError {
    let message = match error {
        RemoteError::Constraint(message) => message,
        other => other.to_string(),
    };
    OpError::Validation(vec![FieldError::new(R::KIND, message)])
}
