//! Food Item MCP Tools
//!
//! Tools for managing food items in the database.

use serde::Serialize;

use crate::db::{Database, SqliteJournalStore};
use crate::models::{FoodItem, FoodItemCreate, FoodItemField, FoodItemUpdate};
use crate::nutrition::{propagate_update, NutritionFacts, PropagationReport, Unit};

/// Summary of a food item for search results
#[derive(Debug, Serialize)]
pub struct FoodItemSummary {
    pub id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub serving_size: f64,
    pub serving_unit: Unit,
    pub calories: f64,
}

impl From<&FoodItem> for FoodItemSummary {
    fn from(item: &FoodItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            brand: item.brand.clone(),
            serving_size: item.facts.serving_size,
            serving_unit: item.facts.serving_unit,
            calories: item.facts.calories,
        }
    }
}

/// Response for search_food_items
#[derive(Debug, Serialize)]
pub struct SearchFoodItemsResponse {
    pub items: Vec<FoodItemSummary>,
    pub total: usize,
}

/// Full food item detail response
#[derive(Debug, Serialize)]
pub struct FoodItemDetail {
    #[serde(flatten)]
    pub item: FoodItem,
    /// Consumed entries logged from this item
    pub usage_count: i64,
}

/// Response for update_food_item
#[derive(Debug, Serialize)]
pub struct UpdateFoodItemResponse {
    pub item: FoodItem,
    /// Present when existing entries were rewritten
    pub propagation: Option<PropagationReport>,
}

/// Response for delete_food_item blocked
#[derive(Debug, Serialize)]
pub struct DeleteFoodItemBlockedResponse {
    pub error: String,
    pub usage_count: i64,
}

/// Response for successful delete_food_item
#[derive(Debug, Serialize)]
pub struct DeleteFoodItemSuccessResponse {
    pub success: bool,
    pub deleted_id: i64,
}

fn validate_facts(facts: &NutritionFacts) -> Result<(), String> {
    if !(facts.serving_size > 0.0) {
        return Err("serving_size must be greater than 0".to_string());
    }

    let required = [
        ("calories", facts.calories),
        ("carbs", facts.carbs),
        ("protein", facts.protein),
        ("fat", facts.fat),
    ];
    for (name, value) in required {
        if value < 0.0 {
            return Err(format!("{} cannot be negative", name));
        }
    }

    for (name, value) in [("sugar", facts.sugar), ("fiber", facts.fiber)] {
        if value.map_or(false, |v| v < 0.0) {
            return Err(format!("{} cannot be negative", name));
        }
    }

    Ok(())
}

/// Add a new food item
pub fn add_food_item(db: &Database, mut data: FoodItemCreate) -> Result<FoodItem, String> {
    let name = data.name.trim();
    if name.is_empty() {
        return Err("Food item name cannot be empty".to_string());
    }
    data.name = name.to_string();

    validate_facts(&data.facts).map_err(|e| {
        tracing::warn!("Rejected food item '{}': {}", data.name, e);
        e
    })?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let item = FoodItem::create(&conn, &data)
        .map_err(|e| format!("Failed to create food item: {}", e))?;

    tracing::info!("Added food item {} '{}'", item.id, item.name);
    Ok(item)
}

/// Search food items by name or brand. A blank query lists everything.
pub fn search_food_items(db: &Database, query: &str, limit: i64) -> Result<SearchFoodItemsResponse, String> {
    let limit = limit.min(100).max(1);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let query = query.trim();
    let items = if query.is_empty() {
        FoodItem::list(&conn, limit, 0)
    } else {
        FoodItem::search(&conn, query, limit)
    }
    .map_err(|e| format!("Search failed: {}", e))?;

    let summaries: Vec<FoodItemSummary> = items.iter().map(FoodItemSummary::from).collect();
    let total = summaries.len();

    Ok(SearchFoodItemsResponse {
        items: summaries,
        total,
    })
}

/// Get a food item by ID with usage information
pub fn get_food_item(db: &Database, id: i64) -> Result<Option<FoodItemDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let item = FoodItem::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get food item: {}", e))?;

    match item {
        Some(item) => {
            let usage_count = FoodItem::get_usage_count(&conn, id)
                .map_err(|e| format!("Failed to get usage count: {}", e))?;
            Ok(Some(FoodItemDetail { item, usage_count }))
        }
        None => Ok(None),
    }
}

/// Update a food item.
///
/// With `update_existing_entries`, every consumed entry of the item is
/// re-snapshotted against the new facts. The item and its snapshots are
/// written in one transaction, so a failed sweep leaves the old facts in
/// place as well.
pub fn update_food_item(
    db: &Database,
    id: i64,
    data: FoodItemUpdate,
    update_existing_entries: bool,
) -> Result<UpdateFoodItemResponse, String> {
    for change in &data.changes {
        if let FoodItemField::Name(name) = change {
            if name.trim().is_empty() {
                return Err("Food item name cannot be empty".to_string());
            }
        }
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let current = FoodItem::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get food item: {}", e))?
        .ok_or_else(|| format!("Food item not found with id: {}", id))?;
    validate_facts(&data.apply_to(&current.facts))?;

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| format!("Database error: {}", e))?;

    let item = FoodItem::update(&tx, id, &data)
        .map_err(|e| format!("Failed to update food item: {}", e))?
        .ok_or_else(|| format!("Food item not found with id: {}", id))?;

    let propagation = if update_existing_entries && data.changes_facts() {
        let store = SqliteJournalStore::new(&tx);
        let report = propagate_update(&store, id, &item.facts).map_err(|e| {
            tracing::warn!("Sweep for food item {} failed, keeping old facts: {}", id, e);
            format!("Failed to update existing entries: {}", e)
        })?;
        Some(report)
    } else {
        None
    };

    tx.commit()
        .map_err(|e| format!("Failed to update food item: {}", e))?;

    tracing::info!("Updated food item {} ({} changes)", id, data.changes.len());
    Ok(UpdateFoodItemResponse { item, propagation })
}

/// Delete a food item (blocked while consumed entries reference it)
pub fn delete_food_item(
    db: &Database,
    id: i64,
) -> Result<Result<DeleteFoodItemSuccessResponse, DeleteFoodItemBlockedResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let food_item = FoodItem::get_by_id(&conn, id)
        .map_err(|e| format!("Database error: {}", e))?;
    if food_item.is_none() {
        return Err(format!("Food item not found with id: {}", id));
    }

    let usage_count = FoodItem::get_usage_count(&conn, id)
        .map_err(|e| format!("Failed to check usage: {}", e))?;

    if usage_count > 0 {
        return Ok(Err(DeleteFoodItemBlockedResponse {
            error: format!("Cannot delete food item: logged in {} journal entries", usage_count),
            usage_count,
        }));
    }

    FoodItem::delete(&conn, id)
        .map_err(|e| format!("Failed to delete food item: {}", e))?;

    tracing::info!("Deleted food item {}", id);
    Ok(Ok(DeleteFoodItemSuccessResponse {
        success: true,
        deleted_id: id,
    }))
}
