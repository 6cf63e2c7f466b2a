//! Retroactive snapshot updates
//!
//! Consumed food items freeze their macros when logged. Editing a food item
//! leaves them alone unless the user explicitly asks to update existing
//! entries, which runs [`propagate_update`]. Every affected snapshot is
//! recomputed up front and then handed to the store as a single batch, so a
//! sweep either rewrites all of them or none. The sweep never re-resolves
//! servings, so what was eaten stays what was eaten.

use serde::{Deserialize, Serialize};

use super::error::{NutritionError, NutritionResult};
use super::macros::{compute_consumed_macros, Macros, NutritionFacts};
use super::units::Unit;
use crate::models::ConsumedFoodItem;

/// Where a consumed item lives in the journal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPath {
    pub date: String,
    pub meal_order: i64,
}

/// A consumed item referencing the food item being updated
#[derive(Debug, Clone)]
pub struct AffectedEntry {
    pub path: EntryPath,
    pub item: ConsumedFoodItem,
}

/// New snapshot values for one consumed item
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotUpdate {
    pub consumed_item_id: i64,
    pub servings: f64,
    pub consumed_quantity: f64,
    pub consumed_unit: Unit,
    pub macros: Macros,
}

/// Persistence needed by the update sweep
pub trait JournalStore {
    fn food_item_facts(&self, food_item_id: i64) -> NutritionResult<Option<NutritionFacts>>;

    fn entries_referencing_item(&self, food_item_id: i64) -> NutritionResult<Vec<AffectedEntry>>;

    /// Apply every update or none of them. A failure must leave all
    /// snapshots as they were and report [`NutritionError::PartialWrite`].
    fn write_all(&self, updates: &[SnapshotUpdate]) -> NutritionResult<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropagationReport {
    pub food_item_id: i64,
    pub entries_updated: usize,
    /// Distinct journal dates touched, ascending
    pub dates: Vec<String>,
}

/// Recompute snapshots for `affected` against `updated` facts.
///
/// Each snapshot keeps its stored servings along with the quantity and
/// unit that were consumed. Only the macros are scaled again from the new
/// per-serving values.
pub fn plan_snapshot_updates(updated: &NutritionFacts, affected: &[AffectedEntry]) -> Vec<SnapshotUpdate> {
    affected
        .iter()
        .map(|entry| {
            let item = &entry.item;
            SnapshotUpdate {
                consumed_item_id: item.id,
                servings: item.servings,
                consumed_quantity: item.consumed_quantity,
                consumed_unit: item.consumed_unit,
                macros: compute_consumed_macros(updated, item.servings),
            }
        })
        .collect()
}

/// Rewrite every snapshot of `food_item_id` with `updated` facts
pub fn propagate_update<S: JournalStore + ?Sized>(
    store: &S,
    food_item_id: i64,
    updated: &NutritionFacts,
) -> NutritionResult<PropagationReport> {
    if store.food_item_facts(food_item_id)?.is_none() {
        return Err(NutritionError::FoodItemNotFound(food_item_id));
    }

    let affected = store.entries_referencing_item(food_item_id)?;
    let updates = plan_snapshot_updates(updated, &affected);

    if !updates.is_empty() {
        store.write_all(&updates)?;
    }

    let mut dates: Vec<String> = affected.into_iter().map(|e| e.path.date).collect();
    dates.sort();
    dates.dedup();

    tracing::info!(
        "Propagated food item {} to {} consumed entries across {} days",
        food_item_id,
        updates.len(),
        dates.len()
    );

    Ok(PropagationReport {
        food_item_id,
        entries_updated: updates.len(),
        dates,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::nutrition::units::ConsumedUnit;

    struct MemoryStore {
        facts: NutritionFacts,
        entries: RefCell<Vec<AffectedEntry>>,
        writes: Cell<usize>,
        reject_writes: bool,
    }

    impl JournalStore for MemoryStore {
        fn food_item_facts(&self, food_item_id: i64) -> NutritionResult<Option<NutritionFacts>> {
            Ok((food_item_id == 1).then(|| self.facts.clone()))
        }

        fn entries_referencing_item(&self, food_item_id: i64) -> NutritionResult<Vec<AffectedEntry>> {
            Ok(self
                .entries
                .borrow()
                .iter()
                .filter(|e| e.item.food_item_id == food_item_id)
                .cloned()
                .collect())
        }

        fn write_all(&self, updates: &[SnapshotUpdate]) -> NutritionResult<()> {
            self.writes.set(self.writes.get() + 1);
            if self.reject_writes {
                return Err(NutritionError::PartialWrite("disk full".to_string()));
            }
            let mut entries = self.entries.borrow_mut();
            for update in updates {
                let entry = entries
                    .iter_mut()
                    .find(|e| e.item.id == update.consumed_item_id)
                    .ok_or_else(|| NutritionError::PartialWrite("missing entry".to_string()))?;
                entry.item.servings = update.servings;
                entry.item.consumed_quantity = update.consumed_quantity;
                entry.item.consumed_unit = update.consumed_unit;
                entry.item.macros = update.macros.clone();
            }
            Ok(())
        }
    }

    fn oats(calories: f64, serving_size: f64, serving_unit: Unit) -> NutritionFacts {
        NutritionFacts {
            serving_size,
            serving_unit,
            calories,
            carbs: 27.0,
            protein: 5.0,
            fat: 3.0,
            sugar: None,
            fiber: Some(4.0),
        }
    }

    /// Logged against a 50 g serving of 150 kcal
    fn entry(id: i64, date: &str, quantity: f64, unit: ConsumedUnit, servings: f64) -> AffectedEntry {
        let facts = oats(150.0, 50.0, Unit::Grams);
        AffectedEntry {
            path: EntryPath {
                date: date.to_string(),
                meal_order: 0,
            },
            item: ConsumedFoodItem {
                id,
                meal_id: 1,
                food_item_id: 1,
                name: "Oats".to_string(),
                quantity,
                unit,
                servings,
                consumed_quantity: servings * 50.0,
                consumed_unit: Unit::Grams,
                macros: compute_consumed_macros(&facts, servings),
                created_at: String::new(),
                updated_at: String::new(),
            },
        }
    }

    fn store(entries: Vec<AffectedEntry>) -> MemoryStore {
        MemoryStore {
            facts: oats(150.0, 50.0, Unit::Grams),
            entries: RefCell::new(entries),
            writes: Cell::new(0),
            reject_writes: false,
        }
    }

    #[test]
    fn test_plan_keeps_servings_when_serving_size_changes() {
        let affected = vec![
            entry(1, "2025-01-01", 100.0, Unit::Grams.into(), 2.0),
            entry(2, "2025-01-02", 1.0, ConsumedUnit::Servings, 1.0),
        ];

        let updated = oats(200.0, 100.0, Unit::Grams);
        let plan = plan_snapshot_updates(&updated, &affected);

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].servings, 2.0);
        assert_eq!(plan[0].consumed_quantity, 100.0);
        assert_eq!(plan[0].consumed_unit, Unit::Grams);
        assert_eq!(plan[0].macros.calories, 400.0);
        assert_eq!(plan[1].servings, 1.0);
        assert_eq!(plan[1].consumed_quantity, 50.0);
        assert_eq!(plan[1].macros.calories, 200.0);
        assert_eq!(plan[1].macros.sugar, None);
    }

    #[test]
    fn test_plan_survives_serving_unit_change() {
        let affected = vec![entry(1, "2025-01-01", 100.0, Unit::Grams.into(), 2.0)];

        let plan = plan_snapshot_updates(&oats(120.0, 1.0, Unit::Cups), &affected);

        assert_eq!(plan[0].servings, 2.0);
        assert_eq!(plan[0].consumed_quantity, 100.0);
        assert_eq!(plan[0].consumed_unit, Unit::Grams);
        assert_eq!(plan[0].macros.calories, 240.0);
        assert_eq!(plan[0].macros.fiber, Some(8.0));
    }

    #[test]
    fn test_propagate_rewrites_all_entries() {
        let s = store(vec![
            entry(1, "2025-01-02", 100.0, Unit::Grams.into(), 2.0),
            entry(2, "2025-01-01", 50.0, Unit::Grams.into(), 1.0),
            entry(3, "2025-01-02", 1.0, ConsumedUnit::Servings, 1.0),
        ]);

        let report = propagate_update(&s, 1, &oats(100.0, 50.0, Unit::Grams)).unwrap();

        assert_eq!(report.entries_updated, 3);
        assert_eq!(report.dates, vec!["2025-01-01", "2025-01-02"]);
        assert_eq!(s.writes.get(), 1);
        let calories: Vec<f64> = s.entries.borrow().iter().map(|e| e.item.macros.calories).collect();
        assert_eq!(calories, vec![200.0, 100.0, 100.0]);
        let servings: Vec<f64> = s.entries.borrow().iter().map(|e| e.item.servings).collect();
        assert_eq!(servings, vec![2.0, 1.0, 1.0]);
    }

    #[test]
    fn test_rejected_write_is_reported() {
        let mut s = store(vec![
            entry(1, "2025-01-01", 1.0, ConsumedUnit::Servings, 1.0),
            entry(2, "2025-01-01", 100.0, Unit::Grams.into(), 2.0),
        ]);
        s.reject_writes = true;

        let err = propagate_update(&s, 1, &oats(100.0, 50.0, Unit::Grams)).unwrap_err();

        assert!(matches!(err, NutritionError::PartialWrite(_)));
        assert_eq!(s.writes.get(), 1);
        assert!(s.entries.borrow().iter().all(|e| e.item.macros.calories == 150.0 * e.item.servings));
    }

    #[test]
    fn test_no_entries_skips_write() {
        let s = store(vec![]);
        let report = propagate_update(&s, 1, &oats(100.0, 50.0, Unit::Grams)).unwrap();
        assert_eq!(report.entries_updated, 0);
        assert!(report.dates.is_empty());
        assert_eq!(s.writes.get(), 0);
    }

    #[test]
    fn test_unknown_food_item() {
        let s = store(vec![]);
        let err = propagate_update(&s, 99, &oats(100.0, 50.0, Unit::Grams)).unwrap_err();
        assert_eq!(err, NutritionError::FoodItemNotFound(99));
    }
}
