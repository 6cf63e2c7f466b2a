//! Food Item model
//!
//! A food the user can log, with its per-serving nutrition facts.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::nutrition::{NutritionFacts, Unit};

/// A food item with nutritional information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub facts: NutritionFacts,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new food item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItemCreate {
    pub name: String,
    pub brand: Option<String>,
    pub facts: NutritionFacts,
    pub notes: Option<String>,
}

/// A single field change on a food item.
///
/// Optional nutrients take an `Option` so they can be cleared back to
/// "not tracked".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FoodItemField {
    Name(String),
    Brand(Option<String>),
    ServingSize(f64),
    ServingUnit(Unit),
    Calories(f64),
    Carbs(f64),
    Protein(f64),
    Fat(f64),
    Sugar(Option<f64>),
    Fiber(Option<f64>),
    Notes(Option<String>),
}

/// Data for updating a food item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodItemUpdate {
    pub changes: Vec<FoodItemField>,
}

impl FoodItemUpdate {
    /// Whether any change touches the nutrition facts
    pub fn changes_facts(&self) -> bool {
        self.changes
            .iter()
            .any(|c| !matches!(c, FoodItemField::Name(_) | FoodItemField::Brand(_) | FoodItemField::Notes(_)))
    }

    /// The nutrition facts `facts` would have after these changes
    pub fn apply_to(&self, facts: &NutritionFacts) -> NutritionFacts {
        let mut next = facts.clone();
        for change in &self.changes {
            match change {
                FoodItemField::ServingSize(v) => next.serving_size = *v,
                FoodItemField::ServingUnit(v) => next.serving_unit = *v,
                FoodItemField::Calories(v) => next.calories = *v,
                FoodItemField::Carbs(v) => next.carbs = *v,
                FoodItemField::Protein(v) => next.protein = *v,
                FoodItemField::Fat(v) => next.fat = *v,
                FoodItemField::Sugar(v) => next.sugar = *v,
                FoodItemField::Fiber(v) => next.fiber = *v,
                FoodItemField::Name(_) | FoodItemField::Brand(_) | FoodItemField::Notes(_) => {}
            }
        }
        next
    }
}

impl FoodItem {
    /// Create a FoodItem from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            brand: row.get("brand")?,
            facts: NutritionFacts {
                serving_size: row.get("serving_size")?,
                serving_unit: unit_column(row, "serving_unit")?,
                calories: row.get("calories")?,
                carbs: row.get("carbs")?,
                protein: row.get("protein")?,
                fat: row.get("fat")?,
                sugar: row.get("sugar")?,
                fiber: row.get("fiber")?,
            },
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new food item into the database
    pub fn create(conn: &Connection, data: &FoodItemCreate) -> DbResult<Self> {
        let f = &data.facts;
        conn.execute(
            r#"
            INSERT INTO food_items (
                name, brand, serving_size, serving_unit,
                calories, carbs, protein, fat, sugar, fiber, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                data.name,
                data.brand,
                f.serving_size,
                f.serving_unit.as_str(),
                f.calories,
                f.carbs,
                f.protein,
                f.fat,
                f.sugar,
                f.fiber,
                data.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("Food item {}", id)))
    }

    /// Get a food item by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM food_items WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Search food items by name or brand
    pub fn search(conn: &Connection, query: &str, limit: i64) -> DbResult<Vec<Self>> {
        let search_pattern = format!("%{}%", query);
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM food_items
            WHERE name LIKE ?1 OR brand LIKE ?1
            ORDER BY name ASC
            LIMIT ?2
            "#,
        )?;

        let items = stmt
            .query_map(params![search_pattern, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// List food items alphabetically
    pub fn list(conn: &Connection, limit: i64, offset: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM food_items ORDER BY name ASC LIMIT ?1 OFFSET ?2",
        )?;

        let items = stmt
            .query_map(params![limit, offset], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Apply field changes to a food item
    pub fn update(conn: &Connection, id: i64, data: &FoodItemUpdate) -> DbResult<Option<Self>> {
        if data.changes.is_empty() {
            return Self::get_by_id(conn, id);
        }

        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        for change in &data.changes {
            let (column, value): (&str, Box<dyn rusqlite::ToSql>) = match change {
                FoodItemField::Name(v) => ("name", boxed(v.clone())),
                FoodItemField::Brand(v) => ("brand", boxed(v.clone())),
                FoodItemField::ServingSize(v) => ("serving_size", boxed(*v)),
                FoodItemField::ServingUnit(v) => ("serving_unit", boxed(v.as_str())),
                FoodItemField::Calories(v) => ("calories", boxed(*v)),
                FoodItemField::Carbs(v) => ("carbs", boxed(*v)),
                FoodItemField::Protein(v) => ("protein", boxed(*v)),
                FoodItemField::Fat(v) => ("fat", boxed(*v)),
                FoodItemField::Sugar(v) => ("sugar", boxed(*v)),
                FoodItemField::Fiber(v) => ("fiber", boxed(*v)),
                FoodItemField::Notes(v) => ("notes", boxed(v.clone())),
            };
            params_vec.push(value);
            updates.push(format!("{} = ?{}", column, params_vec.len()));
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE food_items SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );

        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Number of consumed entries referencing this food item
    pub fn get_usage_count(conn: &Connection, id: i64) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM consumed_food_items WHERE food_item_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Delete a food item. Fails while consumed entries reference it.
    /// Returns Ok(false) if not found
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM food_items WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

fn boxed<T: rusqlite::ToSql + 'static>(value: T) -> Box<dyn rusqlite::ToSql> {
    Box::new(value)
}

/// Read a unit token column
pub(crate) fn unit_column(row: &Row, column: &str) -> rusqlite::Result<Unit> {
    let token: String = row.get(column)?;
    Unit::from_str(&token).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("unknown unit '{}' in column {}", token, column).into(),
        )
    })
}
