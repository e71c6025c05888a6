//! SQLite remote adapter for the licence tracker.
//!
//! [`SqliteRemote`] implements [`RemoteSource`](lictrack_store::RemoteSource)
//! for both licences and users over one database file. Constraint
//! violations are reported as `RemoteError::Constraint`; every other
//! failure as `RemoteError::Connectivity`, which sends the store offline.

mod error;
mod rows;
mod sqlite;

pub use error::{DbError, DbResult};
pub use rows::SqlRecord;
pub use sqlite::SqliteRemote;
