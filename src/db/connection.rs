//! Journal database handle
//!
//! Food items, journal days and their consumed snapshots live in one SQLite
//! file. Tools borrow a pooled connection per call. Foreign keys are on for
//! every connection: deleting a day cascades to its meals and logged items,
//! and a food item still referenced by a snapshot cannot be deleted.

use std::path::Path;
use std::sync::Arc;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

/// Applied to every connection the pool opens on the journal file
const JOURNAL_PRAGMAS: &str = "PRAGMA foreign_keys = ON;
     PRAGMA journal_mode = WAL;
     PRAGMA synchronous = NORMAL;
     PRAGMA cache_size = -64000;
     PRAGMA temp_store = MEMORY;";

/// Enough for the MCP handlers; SQLite serializes writers anyway
const JOURNAL_POOL_SIZE: u32 = 8;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Journal database unavailable: {0}")]
    Connection(#[from] r2d2::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    Invalid(String),
}

pub type DbResult<T> = Result<T, DbError>;

pub type JournalConn = PooledConnection<SqliteConnectionManager>;

/// Shared pool over the journal database
#[derive(Clone)]
pub struct Database {
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl Database {
    /// Open (creating if needed) the journal file at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let path = path.as_ref();
        tracing::debug!("Opening journal database at {}", path.display());

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE | OpenFlags::SQLITE_OPEN_URI;
        let manager = SqliteConnectionManager::file(path)
            .with_flags(flags)
            .with_init(|conn| conn.execute_batch(JOURNAL_PRAGMAS));

        Self::from_manager(manager, JOURNAL_POOL_SIZE)
    }

    /// Open a private in-memory journal.
    ///
    /// Every in-memory connection is its own database, so the pool holds a
    /// single connection. Callers must not hold one connection while asking
    /// for another.
    pub fn open_in_memory() -> DbResult<Self> {
        let manager = SqliteConnectionManager::memory()
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

        Self::from_manager(manager, 1)
    }

    fn from_manager(manager: SqliteConnectionManager, max_size: u32) -> DbResult<Self> {
        let pool = Pool::builder().max_size(max_size).build(manager)?;
        Ok(Self { pool: Arc::new(pool) })
    }

    pub fn get_conn(&self) -> DbResult<JournalConn> {
        Ok(self.pool.get()?)
    }

    /// Run `f` on a borrowed connection, returning it to the pool afterwards
    pub fn with_conn<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        let conn = self.get_conn()?;
        f(&conn)
    }
}
