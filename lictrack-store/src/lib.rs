//! Resilient licence and user storage.
//!
//! [`ResilientStore`] performs CRUD against a [`RemoteSource`] and falls
//! back to a local cache as soon as the remote stops answering. Once
//! offline, the store stays offline until [`ResilientStore::reconnect`]
//! pushes the offline journal back.
//!
//! # Architecture
//!
//! - One generic store, parameterized by [`Record`] (licences and users)
//! - Every remote call is bounded by [`StoreConfig::remote_timeout_ms`]
//! - Expected failures (validation, not found) are returned as [`OpResult`]
//! - The cache can be kept across sessions with a [`CachePersistence`]

mod cache;
mod config;
mod error;
mod persist;
mod record;
pub mod remote;
mod result;
mod store;
mod users;

pub use cache::CacheSnapshot;
pub use config::{StoreConfig, DEFAULT_REMOTE_TIMEOUT_MS};
pub use error::{OpError, RemoteError, RemoteResult, StoreError, StoreResult};
pub use persist::{CachePersistence, JsonFileCache};
pub use record::Record;
pub use remote::RemoteSource;
pub use result::{InitReport, OpResult, StoreStatus, SyncReport};
pub use store::{ResilientStore, StoreBuilder, StoreMode};
pub use users::{LicenceStore, UserStore};
