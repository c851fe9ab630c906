//! SQLite-backed key-value engine.
//!
//! A single `kv` table keyed by the text key. Every call opens its own
//! connection on the blocking pool, so the engine is cheap to clone.

use super::{storage_error, task_error};
use profile_store_ports::{BoxFuture, KeyValueStorePort};
use profile_store_shared::{RequestContext, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tokio::task::spawn_blocking;

/// Durable engine storing all keys in one SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteKeyValueStore {
    path: PathBuf,
}

impl SqliteKeyValueStore {
    /// Create a store backed by the database at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Database file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn run<T, F>(&self, operation: &'static str, task: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let path = self.path.clone();
        spawn_blocking(move || {
            let conn = open_connection(&path, operation)?;
            task(&conn).map_err(|error| storage_error(operation, error))
        })
        .await
        .map_err(|error| task_error(operation, error))?
    }
}

impl KeyValueStorePort for SqliteKeyValueStore {
    fn get(&self, ctx: &RequestContext, key: Box<str>) -> BoxFuture<'_, Result<Option<String>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("kv_sqlite.get")?;
            self.run("kv_sqlite.get", move |conn| {
                conn.query_row("SELECT value FROM kv WHERE key = ?1", [key.as_ref()], |row| {
                    row.get(0)
                })
                .optional()
            })
            .await
        })
    }

    fn put(
        &self,
        ctx: &RequestContext,
        key: Box<str>,
        value: String,
    ) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("kv_sqlite.put")?;
            self.run("kv_sqlite.put", move |conn| {
                conn.execute(
                    "INSERT INTO kv (key, value) VALUES (?1, ?2) \
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    (key.as_ref(), value.as_str()),
                )
                .map(|_| ())
            })
            .await
        })
    }

    fn delete(&self, ctx: &RequestContext, key: Box<str>) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("kv_sqlite.delete")?;
            self.run("kv_sqlite.delete", move |conn| {
                conn.execute("DELETE FROM kv WHERE key = ?1", [key.as_ref()])
                    .map(|_| ())
            })
            .await
        })
    }

    fn list_keys(
        &self,
        ctx: &RequestContext,
        prefix: Box<str>,
    ) -> BoxFuture<'_, Result<Vec<Box<str>>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("kv_sqlite.list_keys")?;
            self.run("kv_sqlite.list_keys", move |conn| {
                // substr avoids LIKE wildcard escaping for prefixes with `_` or `%`.
                let mut statement = conn.prepare(
                    "SELECT key FROM kv WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
                )?;
                let rows = statement.query_map([prefix.as_ref()], |row| row.get::<_, String>(0))?;
                rows.map(|row| row.map(String::into_boxed_str)).collect()
            })
            .await
        })
    }
}

fn open_connection(path: &Path, operation: &'static str) -> Result<Connection> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|error| storage_error(operation, error))?;
    }

    let conn = Connection::open(path).map_err(|error| storage_error(operation, error))?;
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY NOT NULL, value TEXT NOT NULL);",
    )
    .map_err(|error| storage_error(operation, error))?;
    Ok(conn)
}
