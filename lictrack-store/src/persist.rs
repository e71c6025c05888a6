//! Durable storage for the offline cache.
//!
//! Persistence is best effort: the store logs failures and carries on with
//! the in-memory cache.

use crate::cache::CacheSnapshot;
use crate::error::StoreResult;
use crate::record::Record;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads and saves cache snapshots.
pub trait CachePersistence<R: Record>: Send + Sync {
    /// Returns the last saved snapshot, or an empty one if none exists.
    fn load(&self) -> StoreResult<CacheSnapshot<R>>;

    fn save(&self, snapshot: &CacheSnapshot<R>) -> StoreResult<()>;
}

/// Keeps a snapshot as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    path: PathBuf,
}

impl JsonFileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<R: Record> CachePersistence<R> for JsonFileCache {
    fn load(&self) -> StoreResult<CacheSnapshot<R>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no cache file at {}", self.path.display());
                return Ok(CacheSnapshot::default());
            }
            Err(e) => return Err(e.into()),
        };
        let snapshot: CacheSnapshot<R> = serde_json::from_slice(&bytes)?;
        debug!(
            "loaded {} cached {} record(s) from {}",
            snapshot.records.len(),
            R::KIND,
            self.path.display()
        );
        Ok(snapshot)
    }

    fn save(&self, snapshot: &CacheSnapshot<R>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
