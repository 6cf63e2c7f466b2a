//! Journal MCP Tools
//!
//! Tools for journal days, their meals, and logging food into them.

use rusqlite::Connection;
use serde::Serialize;

use crate::db::Database;
use crate::models::{ConsumedFoodItem, ConsumedFoodItemCreate, FoodItem, JournalEntry, MacroTarget, Meal};
use crate::nutrition::{compute_stats, sum_macros, MacroTotals, RemainingMacros, UnitConverter};
use super::{parse_consumed_unit, parse_date};

/// Meal position and name
#[derive(Debug, Serialize)]
pub struct MealSummary {
    pub id: i64,
    pub order: i64,
    pub name: String,
    pub item_count: usize,
}

impl From<&Meal> for MealSummary {
    fn from(meal: &Meal) -> Self {
        Self {
            id: meal.id,
            order: meal.order,
            name: meal.name.clone(),
            item_count: meal.items.len(),
        }
    }
}

/// Response for get_or_create_day
#[derive(Debug, Serialize)]
pub struct GetOrCreateDayResponse {
    pub id: i64,
    pub date: String,
    pub created: bool,  // true if newly created, false if already existed
    pub meals: Vec<MealSummary>,
}

/// A day with its meals and macro stats
#[derive(Debug, Serialize)]
pub struct DayDetail {
    pub id: i64,
    pub date: String,
    pub notes: Option<String>,
    pub meals: Vec<Meal>,
    /// Target definition in effect on this date
    pub target: Option<MacroTarget>,
    pub consumed: MacroTotals,
    /// Absent when no target is defined
    pub remaining: Option<RemainingMacros>,
}

/// Response for meal tools
#[derive(Debug, Serialize)]
pub struct MealResponse {
    pub date: String,
    pub id: i64,
    pub order: i64,
    pub name: String,
}

/// Response for log_food
#[derive(Debug, Serialize)]
pub struct LogFoodResponse {
    pub date: String,
    pub meal_order: i64,
    pub meal_name: String,
    pub item: ConsumedFoodItem,
}

/// Response for delete tools
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted: String,
}

fn require_entry(conn: &Connection, date: &str) -> Result<JournalEntry, String> {
    JournalEntry::get_by_date(conn, date)
        .map_err(|e| format!("Failed to get journal entry: {}", e))?
        .ok_or_else(|| format!("No journal entry for {}", date))
}

fn require_meal(conn: &Connection, entry: &JournalEntry, order: i64) -> Result<Meal, String> {
    Meal::get_by_order(conn, entry.id, order)
        .map_err(|e| format!("Failed to get meal: {}", e))?
        .ok_or_else(|| format!("No meal at position {} on {}", order, entry.date))
}

// ============================================================================
// Day Tools
// ============================================================================

/// Get or create the journal entry for a date (today by default)
pub fn get_or_create_day(
    db: &Database,
    default_meals: &[String],
    date: Option<&str>,
) -> Result<GetOrCreateDayResponse, String> {
    let date = parse_date(date)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let (entry, created) = JournalEntry::get_or_create(&conn, &date, default_meals)
        .map_err(|e| format!("Failed to create journal entry: {}", e))?;

    let meals = Meal::list_for_entry(&conn, entry.id)
        .map_err(|e| format!("Failed to get meals: {}", e))?;

    Ok(GetOrCreateDayResponse {
        id: entry.id,
        date: entry.date,
        created,
        meals: meals.iter().map(MealSummary::from).collect(),
    })
}

/// Get a day with its meals and stats against the target in effect that day
pub fn get_day(db: &Database, date: &str) -> Result<Option<DayDetail>, String> {
    let date = parse_date(Some(date))?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let entry = match JournalEntry::get_by_date(&conn, &date)
        .map_err(|e| format!("Failed to get journal entry: {}", e))?
    {
        Some(entry) => entry,
        None => return Ok(None),
    };

    let meals = Meal::list_for_entry(&conn, entry.id)
        .map_err(|e| format!("Failed to get meals: {}", e))?;

    let target = MacroTarget::effective_on(&conn, &date)
        .map_err(|e| format!("Failed to get macro targets: {}", e))?;

    let (consumed, remaining) = match &target {
        Some(target) => {
            let stats = compute_stats(&target.targets, &meals);
            (stats.consumed, Some(stats.remaining))
        }
        None => (sum_macros(&meals), None),
    };

    Ok(Some(DayDetail {
        id: entry.id,
        date: entry.date,
        notes: entry.notes,
        meals,
        target,
        consumed,
        remaining,
    }))
}

/// Delete a day with all its meals and consumed items
pub fn delete_day(db: &Database, date: &str) -> Result<DeleteResponse, String> {
    let date = parse_date(Some(date))?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let entry = require_entry(&conn, &date)?;
    JournalEntry::delete(&conn, entry.id)
        .map_err(|e| format!("Failed to delete journal entry: {}", e))?;

    tracing::info!("Deleted journal entry for {}", date);
    Ok(DeleteResponse {
        success: true,
        deleted: format!("journal entry {}", date),
    })
}

// ============================================================================
// Meal Tools
// ============================================================================

/// Append a meal to a day, creating the day if needed
pub fn add_meal(
    db: &Database,
    default_meals: &[String],
    date: Option<&str>,
    name: &str,
) -> Result<MealResponse, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Meal name cannot be empty".to_string());
    }
    let date = parse_date(date)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let (entry, _) = JournalEntry::get_or_create(&conn, &date, default_meals)
        .map_err(|e| format!("Failed to create journal entry: {}", e))?;

    let meal = Meal::create(&conn, entry.id, name)
        .map_err(|e| format!("Failed to add meal: {}", e))?;

    tracing::info!("Added meal '{}' at position {} on {}", meal.name, meal.order, date);
    Ok(MealResponse {
        date,
        id: meal.id,
        order: meal.order,
        name: meal.name,
    })
}

pub fn rename_meal(db: &Database, date: &str, order: i64, name: &str) -> Result<MealResponse, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Meal name cannot be empty".to_string());
    }
    let date = parse_date(Some(date))?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let entry = require_entry(&conn, &date)?;
    let meal = require_meal(&conn, &entry, order)?;

    Meal::rename(&conn, meal.id, name)
        .map_err(|e| format!("Failed to rename meal: {}", e))?;

    Ok(MealResponse {
        date,
        id: meal.id,
        order: meal.order,
        name: name.to_string(),
    })
}

/// Delete a meal and its consumed items. Other meals keep their positions.
pub fn delete_meal(db: &Database, date: &str, order: i64) -> Result<DeleteResponse, String> {
    let date = parse_date(Some(date))?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let entry = require_entry(&conn, &date)?;
    let meal = require_meal(&conn, &entry, order)?;

    Meal::delete(&conn, meal.id)
        .map_err(|e| format!("Failed to delete meal: {}", e))?;

    tracing::info!("Deleted meal '{}' from {}", meal.name, date);
    Ok(DeleteResponse {
        success: true,
        deleted: format!("meal '{}' with {} items", meal.name, meal.items.len()),
    })
}

// ============================================================================
// Consumed Item Tools
// ============================================================================

/// Log `quantity` of `unit` of a food item into a meal.
///
/// The day is created with its default meals if it does not exist yet.
#[allow(clippy::too_many_arguments)]
pub fn log_food(
    db: &Database,
    converter: &UnitConverter,
    default_meals: &[String],
    date: Option<&str>,
    meal_order: i64,
    food_item_id: i64,
    quantity: f64,
    unit: &str,
) -> Result<LogFoodResponse, String> {
    if !(quantity > 0.0) || !quantity.is_finite() {
        return Err("quantity must be greater than 0".to_string());
    }
    let unit = parse_consumed_unit(unit)?;
    let date = parse_date(date)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let food_item = FoodItem::get_by_id(&conn, food_item_id)
        .map_err(|e| format!("Failed to get food item: {}", e))?
        .ok_or_else(|| format!("Food item not found with id: {}", food_item_id))?;

    let (entry, _) = JournalEntry::get_or_create(&conn, &date, default_meals)
        .map_err(|e| format!("Failed to create journal entry: {}", e))?;
    let meal = require_meal(&conn, &entry, meal_order)?;

    let data = ConsumedFoodItemCreate::resolve(converter, meal.id, &food_item, quantity, unit)
        .map_err(|e| e.to_string())?;

    let item = ConsumedFoodItem::create(&conn, &data)
        .map_err(|e| format!("Failed to log food: {}", e))?;

    tracing::info!(
        "Logged {} {} of '{}' ({} servings) to {} on {}",
        item.quantity,
        item.unit,
        item.name,
        item.servings,
        meal.name,
        date
    );

    Ok(LogFoodResponse {
        date,
        meal_order: meal.order,
        meal_name: meal.name,
        item,
    })
}

pub fn remove_consumed_item(db: &Database, id: i64) -> Result<DeleteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let item = ConsumedFoodItem::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get consumed item: {}", e))?
        .ok_or_else(|| format!("Consumed item not found with id: {}", id))?;

    ConsumedFoodItem::delete(&conn, id)
        .map_err(|e| format!("Failed to remove consumed item: {}", e))?;

    tracing::info!("Removed consumed item {} '{}'", id, item.name);
    Ok(DeleteResponse {
        success: true,
        deleted: format!("consumed item {} '{}'", id, item.name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FoodItemCreate;
    use crate::nutrition::{Macros, NutritionFacts, Remaining, Unit};
    use crate::tools::test_support::{database, meals};
    use crate::tools::{food_items, targets};

    fn milk(db: &Database) -> FoodItem {
        food_items::add_food_item(db, FoodItemCreate {
            name: "Milk".to_string(),
            brand: None,
            facts: NutritionFacts {
                serving_size: 1.0,
                serving_unit: Unit::Cups,
                calories: 100.0,
                carbs: 12.0,
                protein: 8.0,
                fat: 2.5,
                sugar: Some(12.0),
                fiber: None,
            },
            notes: None,
        })
        .unwrap()
    }

    fn target(calories: f64, fiber: Option<f64>) -> Macros {
        Macros {
            calories,
            carbs: 250.0,
            protein: 120.0,
            fat: 60.0,
            sugar: None,
            fiber,
        }
    }

    #[test]
    fn test_get_or_create_day() {
        let db = database();
        let day = get_or_create_day(&db, &meals(), Some("2025-06-01")).unwrap();
        assert!(day.created);
        let names: Vec<&str> = day.meals.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Breakfast", "Lunch", "Dinner"]);

        let again = get_or_create_day(&db, &meals(), Some("2025-06-01")).unwrap();
        assert!(!again.created);
        assert_eq!(again.id, day.id);
    }

    #[test]
    fn test_log_food_converts_units() {
        let db = database();
        let converter = UnitConverter::default();
        let item = milk(&db);

        // 16 tbsp = 1 cup
        let logged = log_food(&db, &converter, &meals(), Some("2025-06-01"), 0, item.id, 16.0, "tbsp").unwrap();
        assert_eq!(logged.meal_name, "Breakfast");
        assert_eq!(logged.item.servings, 1.0);
        assert_eq!(logged.item.consumed_unit, Unit::Tablespoons);
        assert_eq!(logged.item.macros.calories, 100.0);

        assert!(log_food(&db, &converter, &meals(), Some("2025-06-01"), 0, item.id, 100.0, "g").is_err());
        assert!(log_food(&db, &converter, &meals(), Some("2025-06-01"), 9, item.id, 1.0, "cup").is_err());
        assert!(log_food(&db, &converter, &meals(), Some("2025-06-01"), 0, item.id, 0.0, "cup").is_err());
    }

    #[test]
    fn test_get_day_without_target() {
        let db = database();
        let converter = UnitConverter::default();
        let item = milk(&db);
        log_food(&db, &converter, &meals(), Some("2025-06-01"), 0, item.id, 2.0, "servings").unwrap();

        let day = get_day(&db, "2025-06-01").unwrap().unwrap();
        assert_eq!(day.consumed.calories, 200.0);
        assert_eq!(day.consumed.fiber, 0.0);
        assert!(day.remaining.is_none());
        assert!(get_day(&db, "2025-06-02").unwrap().is_none());
    }

    #[test]
    fn test_get_day_uses_target_in_effect() {
        let db = database();
        let converter = UnitConverter::default();
        let item = milk(&db);

        targets::set_macro_targets(&db, target(2000.0, None), Some("2025-06-01")).unwrap();
        targets::set_macro_targets(&db, target(1800.0, Some(30.0)), Some("2025-06-10")).unwrap();

        log_food(&db, &converter, &meals(), Some("2025-06-05"), 1, item.id, 1.0, "cup").unwrap();
        log_food(&db, &converter, &meals(), Some("2025-06-12"), 1, item.id, 1.0, "cup").unwrap();

        let early = get_day(&db, "2025-06-05").unwrap().unwrap();
        let remaining = early.remaining.unwrap();
        assert_eq!(remaining.calories, 1900.0);
        assert_eq!(remaining.fiber, Remaining::NotApplicable);

        let late = get_day(&db, "2025-06-12").unwrap().unwrap();
        let remaining = late.remaining.unwrap();
        assert_eq!(remaining.calories, 1700.0);
        assert_eq!(remaining.fiber, Remaining::Value(30.0));
        assert_eq!(remaining.sugar, Remaining::NotApplicable);

        let json = serde_json::to_value(&remaining).unwrap();
        assert!(json["sugar"].is_null());
        assert_eq!(json["fiber"], 30.0);
    }

    #[test]
    fn test_meal_management() {
        let db = database();
        let added = add_meal(&db, &meals(), Some("2025-06-01"), "Second breakfast").unwrap();
        assert_eq!(added.order, 3);

        let renamed = rename_meal(&db, "2025-06-01", 3, "Elevenses").unwrap();
        assert_eq!(renamed.name, "Elevenses");

        delete_meal(&db, "2025-06-01", 1).unwrap();
        assert!(rename_meal(&db, "2025-06-01", 1, "Lunch").is_err());

        let day = get_day(&db, "2025-06-01").unwrap().unwrap();
        let orders: Vec<i64> = day.meals.iter().map(|m| m.order).collect();
        assert_eq!(orders, vec![0, 2, 3]);

        delete_day(&db, "2025-06-01").unwrap();
        assert!(get_day(&db, "2025-06-01").unwrap().is_none());
        assert!(delete_day(&db, "2025-06-01").is_err());
    }
}
