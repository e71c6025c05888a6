//! SQLite-backed remote source.

use crate::error::{DbError, DbResult};
use crate::rows::SqlRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lictrack_store::{RemoteError, RemoteResult, RemoteSource};
use lictrack_types::RecordId;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// The shared relational store, as one SQLite database.
///
/// Queries run on the blocking thread pool; the connection is shared
/// behind a mutex.
#[derive(Clone)]
pub struct SqliteRemote {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRemote {
    /// Opens (or creates) a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        debug!("opened licence database at {}", path.display());
        Self::with_connection(conn)
    }

    /// Opens an in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> DbResult<Self> {
        let remote = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        remote.init_schema()?;
        Ok(remote)
    }

    fn init_schema(&self) -> DbResult<()> {
        let conn = self.conn.lock().map_err(|_| DbError::Poisoned)?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS licences (
                id TEXT PRIMARY KEY,
                software_name TEXT NOT NULL,
                vendor TEXT NOT NULL,
                version TEXT NOT NULL,
                type TEXT NOT NULL DEFAULT 'perpetual',
                seats INTEGER NOT NULL DEFAULT 1 CHECK (seats > 0),
                purchase_date TEXT,
                expiration_date TEXT,
                initial_cost REAL NOT NULL DEFAULT 0 CHECK (initial_cost >= 0),
                assigned_to TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                origin TEXT UNIQUE
            );

            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                login TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'read',
                must_change_password INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                origin TEXT UNIQUE
            );
            ",
        )?;
        Ok(())
    }

    /// Runs `op` against the connection on the blocking pool.
    async fn run<T, F>(&self, op: F) -> DbResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> DbResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| DbError::Poisoned)?;
            op(&guard)
        })
        .await
        .map_err(|e| DbError::Task(e.to_string()))?
    }
}

// ── Generic table access ────────────────────────────────────────

fn select_sql<R: SqlRecord>() -> String {
    format!("SELECT {} FROM {}", R::COLUMNS.join(", "), R::TABLE)
}

/// Inserts one row; `values` are in `R::COLUMNS` order, followed by the
/// local id the row originates from.
fn insert_values<R: SqlRecord>(conn: &Connection, mut values: Vec<Value>, origin: &RecordId) -> DbResult<()> {
    let placeholders: Vec<String> = (1..=R::COLUMNS.len() + 1).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "INSERT INTO {} ({}, origin) VALUES ({})",
        R::TABLE,
        R::COLUMNS.join(", "),
        placeholders.join(", ")
    );
    values.push(Value::Text(origin.to_string()));
    conn.execute(&sql, params_from_iter(values))?;
    Ok(())
}

fn select_by_origin<R: SqlRecord>(conn: &Connection, origin: &RecordId) -> DbResult<Option<R>> {
    let sql = format!("{} WHERE origin = ?1", select_sql::<R>());
    Ok(conn
        .query_row(&sql, params![origin.as_str()], |row| R::from_row(row))
        .optional()?)
}

fn select_one_row<R: SqlRecord>(conn: &Connection, id: &RecordId) -> DbResult<Option<R>> {
    let sql = format!("{} WHERE id = ?1", select_sql::<R>());
    Ok(conn
        .query_row(&sql, params![id.as_str()], |row| R::from_row(row))
        .optional()?)
}

fn select_all_rows<R: SqlRecord>(conn: &Connection) -> DbResult<Vec<R>> {
    let sql = format!("{} ORDER BY created_at, id", select_sql::<R>());
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| R::from_row(row))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn update_row<R: SqlRecord>(conn: &Connection, record: &R) -> DbResult<bool> {
    let assignments: Vec<String> = R::COLUMNS
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, col)| format!("{col} = ?{}", i + 1))
        .collect();
    let sql = format!("UPDATE {} SET {} WHERE id = ?1", R::TABLE, assignments.join(", "));
    let changed = conn.execute(&sql, params_from_iter(record.to_values()))?;
    Ok(changed > 0)
}

fn delete_row<R: SqlRecord>(conn: &Connection, id: &RecordId) -> DbResult<bool> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", R::TABLE);
    let changed = conn.execute(&sql, params![id.as_str()])?;
    Ok(changed > 0)
}

#[async_trait]
impl<R: SqlRecord> RemoteSource<R> for SqliteRemote {
    async fn count(&self) -> RemoteResult<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", R::TABLE);
        let count: i64 = self
            .run(move |conn| Ok(conn.query_row(&sql, [], |row| row.get(0))?))
            .await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn insert(&self, draft: &R::Draft, origin: &RecordId, now: DateTime<Utc>) -> RemoteResult<R> {
        let record = R::from_draft(RecordId::random(), draft, now);
        let row = record.clone();
        let origin = origin.clone();
        self.run(move |conn| insert_values::<R>(conn, row.to_values(), &origin))
            .await?;
        debug!("inserted {} {}", R::KIND, record.id());
        Ok(record)
    }

    async fn import(&self, record: &R) -> RemoteResult<R> {
        let record = record.clone();
        let id = RecordId::random();
        let imported = self
            .run(move |conn| {
                if let Some(existing) = select_by_origin::<R>(conn, record.id())? {
                    debug!("{} {} already stored as {}", R::KIND, record.id(), existing.id());
                    return Ok(Some(existing));
                }
                let mut values = record.to_values();
                values[0] = Value::Text(id.to_string());
                insert_values::<R>(conn, values, record.id())?;
                select_one_row::<R>(conn, &id)
            })
            .await?;
        imported.ok_or_else(|| RemoteError::Connectivity("imported row vanished".into()))
    }

    async fn select_all(&self) -> RemoteResult<Vec<R>> {
        Ok(self.run(select_all_rows::<R>).await?)
    }

    async fn select_one(&self, id: &RecordId) -> RemoteResult<Option<R>> {
        let id = id.clone();
        Ok(self.run(move |conn| select_one_row::<R>(conn, &id)).await?)
    }

    async fn update(&self, record: &R) -> RemoteResult<Option<R>> {
        let row = record.clone();
        let found = self.run(move |conn| update_row(conn, &row)).await?;
        Ok(found.then(|| record.clone()))
    }

    async fn delete(&self, id: &RecordId) -> RemoteResult<bool> {
        let id = id.clone();
        Ok(self.run(move |conn| delete_row::<R>(conn, &id)).await?)
    }
}
