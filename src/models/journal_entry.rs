//! Journal Entry model
//!
//! One calendar day's container of meals.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::Meal;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: i64,
    pub date: String,  // ISO date: "2025-01-09"
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl JournalEntry {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            date: row.get("date")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM journal_entries WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_by_date(conn: &Connection, date: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM journal_entries WHERE date = ?1")?;

        match stmt.query_row([date], Self::from_row) {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the entry for `date`, creating it with `default_meals` if needed.
    /// The flag is true when the entry was created.
    pub fn get_or_create(conn: &Connection, date: &str, default_meals: &[String]) -> DbResult<(Self, bool)> {
        if let Some(entry) = Self::get_by_date(conn, date)? {
            return Ok((entry, false));
        }

        let tx = conn.unchecked_transaction()?;
        tx.execute("INSERT INTO journal_entries (date) VALUES (?1)", [date])?;
        let id = tx.last_insert_rowid();
        for name in default_meals {
            Meal::create(&tx, id, name)?;
        }
        tx.commit()?;

        tracing::info!("Created journal entry for {} with {} meals", date, default_meals.len());

        let entry = Self::get_by_id(conn, id)?
            .ok_or_else(|| DbError::NotFound(format!("Journal entry {}", date)))?;
        Ok((entry, true))
    }

    /// Delete an entry with all its meals and consumed items
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM journal_entries WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
