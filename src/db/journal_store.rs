//! SQLite-backed journal store for snapshot propagation

use rusqlite::Connection;

use crate::models::{ConsumedFoodItem, FoodItem};
use crate::nutrition::{AffectedEntry, JournalStore, NutritionError, NutritionFacts, NutritionResult, SnapshotUpdate};

const BATCH_SAVEPOINT: &str = "snapshot_batch";

/// Journal store over a single connection.
///
/// The connection may already be inside a transaction; the snapshot batch
/// then commits or rolls back with it.
pub struct SqliteJournalStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteJournalStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

/// Named savepoint, rolled back on drop unless released
struct SnapshotBatch<'c> {
    conn: &'c Connection,
    released: bool,
}

impl<'c> SnapshotBatch<'c> {
    fn begin(conn: &'c Connection) -> rusqlite::Result<Self> {
        conn.execute_batch(&format!("SAVEPOINT {}", BATCH_SAVEPOINT))?;
        Ok(Self { conn, released: false })
    }

    fn release(mut self) -> rusqlite::Result<()> {
        self.conn.execute_batch(&format!("RELEASE {}", BATCH_SAVEPOINT))?;
        self.released = true;
        Ok(())
    }
}

impl Drop for SnapshotBatch<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let rollback = format!("ROLLBACK TO {0}; RELEASE {0}", BATCH_SAVEPOINT);
        if let Err(e) = self.conn.execute_batch(&rollback) {
            tracing::error!("Failed to roll back snapshot batch: {}", e);
        }
    }
}

impl JournalStore for SqliteJournalStore<'_> {
    fn food_item_facts(&self, food_item_id: i64) -> NutritionResult<Option<NutritionFacts>> {
        Ok(FoodItem::get_by_id(self.conn, food_item_id)?.map(|item| item.facts))
    }

    fn entries_referencing_item(&self, food_item_id: i64) -> NutritionResult<Vec<AffectedEntry>> {
        Ok(ConsumedFoodItem::list_referencing(self.conn, food_item_id)?)
    }

    /// Writes every update under one savepoint. Any failure rolls the whole
    /// batch back.
    fn write_all(&self, updates: &[SnapshotUpdate]) -> NutritionResult<()> {
        let batch = SnapshotBatch::begin(self.conn)
            .map_err(|e| NutritionError::PartialWrite(e.to_string()))?;

        for update in updates {
            let found = ConsumedFoodItem::apply_snapshot(self.conn, update)
                .map_err(|e| NutritionError::PartialWrite(e.to_string()))?;
            if !found {
                return Err(NutritionError::PartialWrite(format!(
                    "consumed item {} no longer exists",
                    update.consumed_item_id
                )));
            }
        }

        batch
            .release()
            .map_err(|e| NutritionError::PartialWrite(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{
        ConsumedFoodItemCreate, FoodItemCreate, JournalEntry, Meal,
    };
    use crate::nutrition::{propagate_update, ConsumedUnit, Unit, UnitConverter};

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn yogurt(calories: f64) -> NutritionFacts {
        NutritionFacts {
            serving_size: 170.0,
            serving_unit: Unit::Grams,
            calories,
            carbs: 6.0,
            protein: 17.0,
            fat: 0.0,
            sugar: Some(4.0),
            fiber: None,
        }
    }

    /// Logs one serving of a new food item on three days
    fn seed(conn: &Connection) -> FoodItem {
        let converter = UnitConverter::default();
        let food = FoodItem::create(conn, &FoodItemCreate {
            name: "Greek yogurt".to_string(),
            brand: None,
            facts: yogurt(100.0),
            notes: None,
        }).unwrap();

        let meals = vec!["Breakfast".to_string()];
        for date in ["2025-04-01", "2025-04-02", "2025-04-03"] {
            let (entry, _) = JournalEntry::get_or_create(conn, date, &meals).unwrap();
            let meal = Meal::get_by_order(conn, entry.id, 0).unwrap().unwrap();
            let data = ConsumedFoodItemCreate::resolve(
                &converter, meal.id, &food, 1.0, ConsumedUnit::Servings,
            ).unwrap();
            ConsumedFoodItem::create(conn, &data).unwrap();
        }
        food
    }

    fn set_calories(conn: &Connection, food_id: i64, calories: f64) {
        conn.execute("UPDATE food_items SET calories = ?1 WHERE id = ?2", rusqlite::params![calories, food_id])
            .unwrap();
    }

    fn logged_calories(conn: &Connection, food_id: i64) -> Vec<f64> {
        ConsumedFoodItem::list_referencing(conn, food_id)
            .unwrap()
            .into_iter()
            .map(|e| e.item.macros.calories)
            .collect()
    }

    #[test]
    fn test_propagation_rewrites_snapshots() {
        let conn = setup();
        let food = seed(&conn);
        set_calories(&conn, food.id, 120.0);

        let store = SqliteJournalStore::new(&conn);
        let report = propagate_update(&store, food.id, &yogurt(120.0)).unwrap();

        assert_eq!(report.entries_updated, 3);
        assert_eq!(report.dates, vec!["2025-04-01", "2025-04-02", "2025-04-03"]);
        assert_eq!(logged_calories(&conn, food.id), vec![120.0, 120.0, 120.0]);
    }

    #[test]
    fn test_failed_write_changes_nothing() {
        let conn = setup();
        let food = seed(&conn);
        let second = ConsumedFoodItem::list_referencing(&conn, food.id).unwrap()[1].item.id;

        conn.execute_batch(&format!(
            "CREATE TRIGGER fail_second BEFORE UPDATE ON consumed_food_items
             WHEN NEW.id = {}
             BEGIN SELECT RAISE(ABORT, 'simulated write failure'); END;",
            second
        )).unwrap();

        let store = SqliteJournalStore::new(&conn);
        let result = propagate_update(&store, food.id, &yogurt(150.0));

        assert!(matches!(result, Err(NutritionError::PartialWrite(_))));
        assert_eq!(logged_calories(&conn, food.id), vec![100.0, 100.0, 100.0]);
    }

    #[test]
    fn test_batch_joins_outer_transaction() {
        let conn = setup();
        let food = seed(&conn);

        {
            let tx = conn.unchecked_transaction().unwrap();
            let store = SqliteJournalStore::new(&tx);
            propagate_update(&store, food.id, &yogurt(130.0)).unwrap();
            assert_eq!(logged_calories(&tx, food.id), vec![130.0, 130.0, 130.0]);
            // dropped without commit
        }

        assert_eq!(logged_calories(&conn, food.id), vec![100.0, 100.0, 100.0]);
    }

    #[test]
    fn test_missing_row_is_partial_write() {
        let conn = setup();
        let store = SqliteJournalStore::new(&conn);
        let update = SnapshotUpdate {
            consumed_item_id: 999,
            servings: 1.0,
            consumed_quantity: 1.0,
            consumed_unit: Unit::Grams,
            macros: yogurt(100.0).per_serving(),
        };
        assert!(matches!(store.write_all(&[update]), Err(NutritionError::PartialWrite(_))));
    }
}
