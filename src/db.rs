use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use crate::config::BOOKMARKS_KEY;

/// Durable home of the bookmark collection: one named entry holding the
/// serialized list. `write` always replaces the whole entry.
pub trait BookmarkStorage: Send + Sync {
    /// The serialized collection, or None if nothing was ever written.
    fn read(&self) -> Result<Option<String>>;

    fn write(&self, serialized: &str) -> Result<()>;
}

/// Open (or create) the SQLite file backing the bookmark entry.
/// WAL must be set before anything else writes; busy_timeout covers a second
/// instance holding the file briefly.
pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating data directory {}", parent.display()))?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA busy_timeout = 5000;
         CREATE TABLE IF NOT EXISTS kv (
             name  TEXT PRIMARY KEY,
             value TEXT NOT NULL
         );",
    )?;
    Ok(conn)
}

/// Bookmark entry stored in the `kv` table of a SQLite database.
pub struct SqliteBookmarkStorage {
    conn: Mutex<Connection>,
    key: String,
}

impl SqliteBookmarkStorage {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = open_db(path)?;
        tracing::debug!("bookmark storage opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
            key: BOOKMARKS_KEY.to_string(),
        })
    }

    /// Entry kept in a private in-memory database. Nothing survives the
    /// process.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("CREATE TABLE kv (name TEXT PRIMARY KEY, value TEXT NOT NULL);")?;
        Ok(Self {
            conn: Mutex::new(conn),
            key: BOOKMARKS_KEY.to_string(),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| anyhow::anyhow!("bookmark db lock poisoned: {e}"))
    }
}

impl BookmarkStorage for SqliteBookmarkStorage {
    fn read(&self) -> Result<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE name = ?1", [&self.key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn write(&self, serialized: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO kv (name, value) VALUES (?1, ?2)",
            (&self.key, serialized),
        )?;
        Ok(())
    }
}

/// Keeps the entry in a string slot. Used by tests and `--in-memory`.
#[derive(Default)]
pub struct MemoryBookmarkStorage {
    entry: Mutex<Option<String>>,
    writes: Mutex<usize>,
}

impl MemoryBookmarkStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(serialized: &str) -> Self {
        Self {
            entry: Mutex::new(Some(serialized.to_string())),
            writes: Mutex::new(0),
        }
    }

    /// How many times `write` has been called.
    pub fn write_count(&self) -> usize {
        self.writes.lock().map(|w| *w).unwrap_or(0)
    }
}

impl BookmarkStorage for MemoryBookmarkStorage {
    fn read(&self) -> Result<Option<String>> {
        let entry = self
            .entry
            .lock()
            .map_err(|e| anyhow::anyhow!("bookmark entry lock poisoned: {e}"))?;
        Ok(entry.clone())
    }

    fn write(&self, serialized: &str) -> Result<()> {
        *self
            .entry
            .lock()
            .map_err(|e| anyhow::anyhow!("bookmark entry lock poisoned: {e}"))? = Some(serialized.to_string());
        if let Ok(mut writes) = self.writes.lock() {
            *writes += 1;
        }
        Ok(())
    }
}

impl<T: BookmarkStorage + ?Sized> BookmarkStorage for std::sync::Arc<T> {
    fn read(&self) -> Result<Option<String>> {
        (**self).read()
    }

    fn write(&self, serialized: &str) -> Result<()> {
        (**self).write(serialized)
    }
}

impl BookmarkStorage for Box<dyn BookmarkStorage> {
    fn read(&self) -> Result<Option<String>> {
        (**self).read()
    }

    fn write(&self, serialized: &str) -> Result<()> {
        (**self).write(serialized)
    }
}
