//! Meal model
//!
//! A named group of consumed items within a journal entry. `order` is unique
//! per entry and is how tools address a meal in place.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::ConsumedFoodItem;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub id: i64,
    pub journal_entry_id: i64,
    pub name: String,
    pub order: i64,
    pub items: Vec<ConsumedFoodItem>,
}

impl Meal {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            journal_entry_id: row.get("journal_entry_id")?,
            name: row.get("name")?,
            order: row.get("meal_order")?,
            items: Vec::new(),
        })
    }

    fn with_items(mut self, conn: &Connection) -> DbResult<Self> {
        self.items = ConsumedFoodItem::list_for_meal(conn, self.id)?;
        Ok(self)
    }

    /// Append a meal after the entry's last one
    pub fn create(conn: &Connection, journal_entry_id: i64, name: &str) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO meals (journal_entry_id, name, meal_order)
            SELECT ?1, ?2, COALESCE(MAX(meal_order) + 1, 0)
            FROM meals WHERE journal_entry_id = ?1
            "#,
            params![journal_entry_id, name],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("Meal {}", id)))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meals WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(meal) => Ok(Some(meal.with_items(conn)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a meal by its position within an entry
    pub fn get_by_order(conn: &Connection, journal_entry_id: i64, order: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM meals WHERE journal_entry_id = ?1 AND meal_order = ?2",
        )?;

        match stmt.query_row(params![journal_entry_id, order], Self::from_row) {
            Ok(meal) => Ok(Some(meal.with_items(conn)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All meals of an entry, in order, with their items
    pub fn list_for_entry(conn: &Connection, journal_entry_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM meals WHERE journal_entry_id = ?1 ORDER BY meal_order",
        )?;

        let meals = stmt
            .query_map([journal_entry_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        meals.into_iter().map(|m| m.with_items(conn)).collect()
    }

    pub fn rename(conn: &Connection, id: i64, name: &str) -> DbResult<bool> {
        let rows = conn.execute("UPDATE meals SET name = ?1 WHERE id = ?2", params![name, id])?;
        Ok(rows > 0)
    }

    /// Delete a meal and its consumed items
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM meals WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
