//! Consumed Food Item model
//!
//! A point-in-time snapshot of eating a food item. Macros are stored as
//! absolute values and do not follow later edits to the food item unless an
//! explicit propagation sweep rewrites them.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::nutrition::{
    compute_consumed_macros, resolve_servings, AffectedEntry, ConsumedUnit, EntryPath, Macros,
    NutritionResult, SnapshotUpdate, Unit, UnitConverter,
};
use super::food_item::unit_column;
use super::FoodItem;

/// A logged consumption
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumedFoodItem {
    pub id: i64,
    pub meal_id: i64,
    pub food_item_id: i64,
    pub name: String,
    /// Quantity as entered
    pub quantity: f64,
    /// Unit as entered
    pub unit: ConsumedUnit,
    pub servings: f64,
    pub consumed_quantity: f64,
    pub consumed_unit: Unit,
    pub macros: Macros,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for inserting a consumed item
#[derive(Debug, Clone)]
pub struct ConsumedFoodItemCreate {
    pub meal_id: i64,
    pub food_item_id: i64,
    pub name: String,
    pub quantity: f64,
    pub unit: ConsumedUnit,
    pub servings: f64,
    pub consumed_quantity: f64,
    pub consumed_unit: Unit,
    pub macros: Macros,
}

impl ConsumedFoodItemCreate {
    /// Resolve servings and snapshot macros for eating `quantity` of `unit`
    pub fn resolve(
        converter: &UnitConverter,
        meal_id: i64,
        food_item: &FoodItem,
        quantity: f64,
        unit: ConsumedUnit,
    ) -> NutritionResult<Self> {
        let resolution = resolve_servings(converter, &food_item.facts.serving(), quantity, unit)?;

        Ok(Self {
            meal_id,
            food_item_id: food_item.id,
            name: food_item.name.clone(),
            quantity,
            unit,
            servings: resolution.servings,
            consumed_quantity: resolution.consumed_quantity,
            consumed_unit: resolution.consumed_unit,
            macros: compute_consumed_macros(&food_item.facts, resolution.servings),
        })
    }
}

impl ConsumedFoodItem {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let unit_token: String = row.get("unit")?;
        let unit = ConsumedUnit::from_str(&unit_token).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                format!("unknown unit '{}' in column unit", unit_token).into(),
            )
        })?;

        Ok(Self {
            id: row.get("id")?,
            meal_id: row.get("meal_id")?,
            food_item_id: row.get("food_item_id")?,
            name: row.get("name")?,
            quantity: row.get("quantity")?,
            unit,
            servings: row.get("servings")?,
            consumed_quantity: row.get("consumed_quantity")?,
            consumed_unit: unit_column(row, "consumed_unit")?,
            macros: Macros {
                calories: row.get("calories")?,
                carbs: row.get("carbs")?,
                protein: row.get("protein")?,
                fat: row.get("fat")?,
                sugar: row.get("sugar")?,
                fiber: row.get("fiber")?,
            },
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &ConsumedFoodItemCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO consumed_food_items (
                meal_id, food_item_id, name, quantity, unit, servings,
                consumed_quantity, consumed_unit,
                calories, carbs, protein, fat, sugar, fiber
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                data.meal_id,
                data.food_item_id,
                data.name,
                data.quantity,
                data.unit.as_str(),
                data.servings,
                data.consumed_quantity,
                data.consumed_unit.as_str(),
                data.macros.calories,
                data.macros.carbs,
                data.macros.protein,
                data.macros.fat,
                data.macros.sugar,
                data.macros.fiber,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("Consumed item {}", id)))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM consumed_food_items WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Items of a meal in logging order
    pub fn list_for_meal(conn: &Connection, meal_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM consumed_food_items WHERE meal_id = ?1 ORDER BY id",
        )?;

        let items = stmt
            .query_map([meal_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Every consumed item of a food item, with its journal location
    pub fn list_referencing(conn: &Connection, food_item_id: i64) -> DbResult<Vec<AffectedEntry>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT c.*, j.date AS entry_date, m.meal_order AS entry_meal_order
            FROM consumed_food_items c
            INNER JOIN meals m ON m.id = c.meal_id
            INNER JOIN journal_entries j ON j.id = m.journal_entry_id
            WHERE c.food_item_id = ?1
            ORDER BY j.date, m.meal_order, c.id
            "#,
        )?;

        let entries = stmt
            .query_map([food_item_id], |row| {
                Ok(AffectedEntry {
                    path: EntryPath {
                        date: row.get("entry_date")?,
                        meal_order: row.get("entry_meal_order")?,
                    },
                    item: Self::from_row(row)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Overwrite the snapshot values of one item. Returns false if missing.
    pub fn apply_snapshot(conn: &Connection, update: &SnapshotUpdate) -> DbResult<bool> {
        let rows = conn.execute(
            r#"
            UPDATE consumed_food_items SET
                servings = ?1,
                consumed_quantity = ?2,
                consumed_unit = ?3,
                calories = ?4,
                carbs = ?5,
                protein = ?6,
                fat = ?7,
                sugar = ?8,
                fiber = ?9,
                updated_at = datetime('now')
            WHERE id = ?10
            "#,
            params![
                update.servings,
                update.consumed_quantity,
                update.consumed_unit.as_str(),
                update.macros.calories,
                update.macros.carbs,
                update.macros.protein,
                update.macros.fat,
                update.macros.sugar,
                update.macros.fiber,
                update.consumed_item_id,
            ],
        )?;
        Ok(rows > 0)
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM consumed_food_items WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
