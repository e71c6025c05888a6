//! In-memory offline cache.

use crate::record::Record;
use lictrack_types::RecordId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Persistable view of the cache: records plus the pending-sync journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "R: Record")]
pub struct CacheSnapshot<R> {
    pub records: Vec<R>,
    /// Remote ids modified while offline.
    #[serde(default)]
    pub dirty: BTreeSet<RecordId>,
    /// Remote ids deleted while offline.
    #[serde(default)]
    pub tombstones: Vec<RecordId>,
    /// Local ids of default records created offline. Pushed only once
    /// edited, through the dirty set.
    #[serde(default)]
    pub seeded: BTreeSet<RecordId>,
}

impl<R> Default for CacheSnapshot<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            dirty: BTreeSet::new(),
            tombstones: Vec::new(),
            seeded: BTreeSet::new(),
        }
    }
}

/// The local record set served while offline.
///
/// Every id ever observed or issued is remembered, so an id minted by
/// [`LocalCache::next_id`] never collides with one seen this session.
#[derive(Debug)]
pub(crate) struct LocalCache<R> {
    records: Vec<R>,
    issued: HashSet<RecordId>,
    counter: u64,
    dirty: BTreeSet<RecordId>,
    tombstones: Vec<RecordId>,
    seeded: BTreeSet<RecordId>,
}

impl<R: Record> LocalCache<R> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            issued: HashSet::new(),
            counter: 0,
            dirty: BTreeSet::new(),
            tombstones: Vec::new(),
            seeded: BTreeSet::new(),
        }
    }

    pub fn restore(snapshot: CacheSnapshot<R>) -> Self {
        let mut cache = Self::new();
        cache.issued.extend(snapshot.tombstones.iter().cloned());
        cache.issued.extend(snapshot.dirty.iter().cloned());
        cache.replace_all(snapshot.records);
        cache.dirty = snapshot.dirty;
        cache.tombstones = snapshot.tombstones;
        cache.seeded = snapshot.seeded;
        cache
    }

    /// Replaces the record set with a fresh remote listing. The journal is
    /// left untouched.
    pub fn replace_all(&mut self, records: Vec<R>) {
        self.issued.extend(records.iter().map(|r| r.id().clone()));
        self.records = records;
    }

    /// Replaces the record set after a complete sync, dropping offline seeds.
    pub fn reset_from_remote(&mut self, records: Vec<R>) {
        self.seeded.clear();
        self.replace_all(records);
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn find(&self, id: &RecordId) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn insert(&mut self, record: R) {
        self.issued.insert(record.id().clone());
        self.records.push(record);
    }

    /// Replaces the record with the same id, or appends it.
    pub fn upsert(&mut self, record: R) {
        self.issued.insert(record.id().clone());
        match self.records.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => *slot = record,
            None => self.records.push(record),
        }
    }

    pub fn remove(&mut self, id: &RecordId) -> Option<R> {
        let pos = self.records.iter().position(|r| r.id() == id)?;
        Some(self.records.remove(pos))
    }

    /// Mints a `local-` id distinct from every id seen this session.
    pub fn next_id(&mut self) -> RecordId {
        loop {
            self.counter += 1;
            let suffix = uuid::Uuid::new_v4().simple().to_string();
            let id = RecordId::new(format!("local-{}-{}", self.counter, &suffix[..8]));
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }

    /// Journals an offline update. Local records are pushed whole, except
    /// edited seeds, which are matched against the remote's own defaults.
    pub fn mark_dirty(&mut self, id: &RecordId) {
        if !id.is_local() || self.seeded.contains(id) {
            self.dirty.insert(id.clone());
        }
    }

    /// Records an offline delete. Local records never reached the remote,
    /// so they leave no tombstone.
    pub fn mark_deleted(&mut self, id: &RecordId) {
        self.dirty.remove(id);
        if !id.is_local() && !self.tombstones.contains(id) {
            self.tombstones.push(id.clone());
        }
    }

    pub fn mark_seeded(&mut self, id: &RecordId) {
        self.seeded.insert(id.clone());
    }

    pub fn clear_dirty(&mut self, id: &RecordId) {
        self.dirty.remove(id);
    }

    pub fn clear_tombstone(&mut self, id: &RecordId) {
        self.tombstones.retain(|t| t != id);
    }

    pub fn dirty(&self) -> &BTreeSet<RecordId> {
        &self.dirty
    }

    pub fn tombstones(&self) -> &[RecordId] {
        &self.tombstones
    }

    fn is_unsynced(&self, record: &R) -> bool {
        record.id().is_local() && !self.seeded.contains(record.id())
    }

    /// Records created offline and not yet pushed. Offline seeds are
    /// excluded; the remote seeds itself.
    pub fn offline_created(&self) -> Vec<R> {
        self.records
            .iter()
            .filter(|r| self.is_unsynced(r))
            .cloned()
            .collect()
    }

    pub fn pending_sync(&self) -> usize {
        self.records.iter().filter(|r| self.is_unsynced(r)).count()
            + self.dirty.len()
            + self.tombstones.len()
    }

    pub fn snapshot(&self) -> CacheSnapshot<R> {
        CacheSnapshot {
            records: self.records.clone(),
            dirty: self.dirty.clone(),
            tombstones: self.tombstones.clone(),
            seeded: self.seeded.clone(),
        }
    }
}
