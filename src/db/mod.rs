//! Database module
//!
//! Handles SQLite connection, migrations, and the journal store used by
//! retroactive snapshot updates.

pub mod connection;
pub mod journal_store;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};
pub use journal_store::SqliteJournalStore;
