//! Macro Journal MCP Server Implementation
//!
//! Implements the MCP server with all Macro Journal tools.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::db::Database;
use crate::models::{FoodItemCreate, FoodItemField, FoodItemUpdate};
use crate::nutrition::{Macros, NutritionFacts, UnitConverter};
use crate::tools::{body_metrics, food_items, journal, parse_unit, targets, units};

/// Macro Journal MCP Service
#[derive(Clone)]
pub struct MacroJournalService {
    database: Database,
    converter: Arc<UnitConverter>,
    config: Arc<Config>,
    tool_router: ToolRouter<MacroJournalService>,
}

impl MacroJournalService {
    pub fn new(database: Database, converter: UnitConverter, config: Config) -> Self {
        Self {
            database,
            converter: Arc::new(converter),
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Unit Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertUnitsParams {
    pub quantity: f64,
    /// Unit token: g, oz, lb, kg, ft, in, cm, floz, l, cup, tbsp, tsp
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ResolveServingsParams {
    pub serving_size: f64,
    pub serving_unit: String,
    pub quantity: f64,
    /// A unit token or "servings"
    pub unit: String,
}

// ============================================================================
// Food Item Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddFoodItemParams {
    pub name: String,
    pub brand: Option<String>,
    pub serving_size: f64,
    pub serving_unit: String,
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    /// Leave out when the label does not list it
    pub sugar: Option<f64>,
    pub fiber: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchFoodItemsParams {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

fn default_search_limit() -> i64 { 20 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FoodItemIdParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateFoodItemParams {
    pub id: i64,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub serving_size: Option<f64>,
    pub serving_unit: Option<String>,
    pub calories: Option<f64>,
    pub carbs: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub sugar: Option<f64>,
    pub fiber: Option<f64>,
    /// Stop tracking sugar for this item
    #[serde(default)]
    pub clear_sugar: bool,
    /// Stop tracking fiber for this item
    #[serde(default)]
    pub clear_fiber: bool,
    pub notes: Option<String>,
    /// Rewrite macros of entries already logged from this item
    #[serde(default)]
    pub update_existing_entries: bool,
}

impl UpdateFoodItemParams {
    fn into_update(self) -> Result<(i64, FoodItemUpdate, bool), String> {
        let mut changes = Vec::new();

        if let Some(v) = self.name { changes.push(FoodItemField::Name(v)); }
        if let Some(v) = self.brand { changes.push(FoodItemField::Brand(Some(v))); }
        if let Some(v) = self.serving_size { changes.push(FoodItemField::ServingSize(v)); }
        if let Some(v) = self.serving_unit { changes.push(FoodItemField::ServingUnit(parse_unit(&v)?)); }
        if let Some(v) = self.calories { changes.push(FoodItemField::Calories(v)); }
        if let Some(v) = self.carbs { changes.push(FoodItemField::Carbs(v)); }
        if let Some(v) = self.protein { changes.push(FoodItemField::Protein(v)); }
        if let Some(v) = self.fat { changes.push(FoodItemField::Fat(v)); }
        if self.clear_sugar {
            changes.push(FoodItemField::Sugar(None));
        } else if let Some(v) = self.sugar {
            changes.push(FoodItemField::Sugar(Some(v)));
        }
        if self.clear_fiber {
            changes.push(FoodItemField::Fiber(None));
        } else if let Some(v) = self.fiber {
            changes.push(FoodItemField::Fiber(Some(v)));
        }
        if let Some(v) = self.notes { changes.push(FoodItemField::Notes(Some(v))); }

        Ok((self.id, FoodItemUpdate { changes }, self.update_existing_entries))
    }
}

// ============================================================================
// Journal Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct OptionalDateParams {
    /// ISO date (YYYY-MM-DD), defaults to today
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DateParams {
    /// ISO date (YYYY-MM-DD)
    pub date: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddMealParams {
    pub date: Option<String>,
    pub name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RenameMealParams {
    pub date: String,
    /// Position of the meal within the day
    pub order: i64,
    pub name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteMealParams {
    pub date: String,
    pub order: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogFoodParams {
    pub date: Option<String>,
    /// Position of the meal within the day (0 is the first meal)
    pub meal_order: i64,
    pub food_item_id: i64,
    pub quantity: f64,
    /// A unit token or "servings"
    #[serde(default = "default_consumed_unit")]
    pub unit: String,
}

fn default_consumed_unit() -> String { "servings".to_string() }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConsumedItemIdParams {
    pub id: i64,
}

// ============================================================================
// Target and Body Metric Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetMacroTargetsParams {
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub sugar: Option<f64>,
    pub fiber: Option<f64>,
    /// First day the targets apply, defaults to today
    pub start_date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecordBodyMetricParams {
    /// "weight" or "height"
    pub kind: String,
    pub value: f64,
    pub unit: String,
    pub date: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetBodyMetricsParams {
    pub kind: String,
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_history_limit() -> i64 { 30 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetLatestBodyMetricParams {
    pub kind: String,
    /// Convert the value into this unit
    pub unit: Option<String>,
}

// ============================================================================
// Tool Router Implementation
// ============================================================================

#[tool_router]
impl MacroJournalService {
    // --- Units ---

    #[tool(description = "Convert a quantity between units of the same dimension (mass, length, or volume)")]
    fn convert_units(&self, Parameters(p): Parameters<ConvertUnitsParams>) -> Result<CallToolResult, McpError> {
        let result = units::convert_units(&self.converter, p.quantity, &p.from, &p.to)
            .map_err(|e| McpError::invalid_params(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Work out how many servings a quantity is for a given serving size")]
    fn resolve_servings(&self, Parameters(p): Parameters<ResolveServingsParams>) -> Result<CallToolResult, McpError> {
        let result = units::resolve_servings(&self.converter, p.serving_size, &p.serving_unit, p.quantity, &p.unit)
            .map_err(|e| McpError::invalid_params(e, None))?;
        to_json(&result)
    }

    // --- Food Items ---

    #[tool(description = "Create a new food item with per-serving nutrition facts")]
    fn add_food_item(&self, Parameters(p): Parameters<AddFoodItemParams>) -> Result<CallToolResult, McpError> {
        let serving_unit = parse_unit(&p.serving_unit).map_err(|e| McpError::invalid_params(e, None))?;
        let data = FoodItemCreate {
            name: p.name,
            brand: p.brand,
            facts: NutritionFacts {
                serving_size: p.serving_size, serving_unit,
                calories: p.calories, carbs: p.carbs, protein: p.protein, fat: p.fat,
                sugar: p.sugar, fiber: p.fiber,
            },
            notes: p.notes,
        };
        let result = food_items::add_food_item(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Search for food items by name or brand. An empty query lists all items.")]
    fn search_food_items(&self, Parameters(p): Parameters<SearchFoodItemsParams>) -> Result<CallToolResult, McpError> {
        let result = food_items::search_food_items(&self.database, &p.query, p.limit).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get full details for a food item including how often it has been logged")]
    fn get_food_item(&self, Parameters(p): Parameters<FoodItemIdParams>) -> Result<CallToolResult, McpError> {
        let result = food_items::get_food_item(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(item) => to_json(&item),
            None => to_json(&serde_json::json!({"error": "Food item not found", "id": p.id})),
        }
    }

    #[tool(description = "Update a food item. Logged entries keep their macros unless update_existing_entries is true, in which case every entry of the item is recalculated.")]
    fn update_food_item(&self, Parameters(p): Parameters<UpdateFoodItemParams>) -> Result<CallToolResult, McpError> {
        let (id, data, update_existing_entries) = p.into_update().map_err(|e| McpError::invalid_params(e, None))?;
        let result = food_items::update_food_item(&self.database, id, data, update_existing_entries)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Delete a food item (only allowed if it has never been logged)")]
    fn delete_food_item(&self, Parameters(p): Parameters<FoodItemIdParams>) -> Result<CallToolResult, McpError> {
        let result = food_items::delete_food_item(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Ok(success) => to_json(&success),
            Err(blocked) => to_json(&blocked),
        }
    }

    // --- Journal ---

    #[tool(description = "Get or create the journal day for a date. New days start with the default meals.")]
    fn get_or_create_day(&self, Parameters(p): Parameters<OptionalDateParams>) -> Result<CallToolResult, McpError> {
        let result = journal::get_or_create_day(&self.database, &self.config.default_meals, p.date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get a day's meals, logged items, and consumed and remaining macros against the targets in effect that day")]
    fn get_day(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = journal::get_day(&self.database, &p.date).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(day) => to_json(&day),
            None => to_json(&serde_json::json!({"error": "No journal entry for date", "date": p.date})),
        }
    }

    #[tool(description = "Delete a day with all its meals and logged items")]
    fn delete_day(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = journal::delete_day(&self.database, &p.date).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Add a meal after the last meal of a day")]
    fn add_meal(&self, Parameters(p): Parameters<AddMealParams>) -> Result<CallToolResult, McpError> {
        let result = journal::add_meal(&self.database, &self.config.default_meals, p.date.as_deref(), &p.name)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Rename the meal at a position within a day")]
    fn rename_meal(&self, Parameters(p): Parameters<RenameMealParams>) -> Result<CallToolResult, McpError> {
        let result = journal::rename_meal(&self.database, &p.date, p.order, &p.name)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Delete the meal at a position within a day, with its logged items")]
    fn delete_meal(&self, Parameters(p): Parameters<DeleteMealParams>) -> Result<CallToolResult, McpError> {
        let result = journal::delete_meal(&self.database, &p.date, p.order)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Log a quantity of a food item into a meal. The unit may be any unit convertible to the item's serving unit, or 'servings'.")]
    fn log_food(&self, Parameters(p): Parameters<LogFoodParams>) -> Result<CallToolResult, McpError> {
        let result = journal::log_food(
            &self.database,
            &self.converter,
            &self.config.default_meals,
            p.date.as_deref(),
            p.meal_order,
            p.food_item_id,
            p.quantity,
            &p.unit,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Remove a logged item from its meal")]
    fn remove_consumed_item(&self, Parameters(p): Parameters<ConsumedItemIdParams>) -> Result<CallToolResult, McpError> {
        let result = journal::remove_consumed_item(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Macro Targets ---

    #[tool(description = "Set daily macro targets from a start date on. Earlier days keep the targets that applied to them.")]
    fn set_macro_targets(&self, Parameters(p): Parameters<SetMacroTargetsParams>) -> Result<CallToolResult, McpError> {
        let values = Macros {
            calories: p.calories, carbs: p.carbs, protein: p.protein, fat: p.fat,
            sugar: p.sugar, fiber: p.fiber,
        };
        let result = targets::set_macro_targets(&self.database, values, p.start_date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get the macro targets in effect on a date and the full target history")]
    fn get_macro_targets(&self, Parameters(p): Parameters<OptionalDateParams>) -> Result<CallToolResult, McpError> {
        let result = targets::get_macro_targets(&self.database, p.date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Body Metrics ---

    #[tool(description = "Record a weight (mass unit) or height (length unit)")]
    fn record_body_metric(&self, Parameters(p): Parameters<RecordBodyMetricParams>) -> Result<CallToolResult, McpError> {
        let result = body_metrics::record_body_metric(&self.database, &p.kind, p.value, &p.unit, p.date.as_deref(), p.notes)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List weight or height records, most recent first")]
    fn get_body_metrics(&self, Parameters(p): Parameters<GetBodyMetricsParams>) -> Result<CallToolResult, McpError> {
        let result = body_metrics::get_body_metrics(&self.database, &p.kind, p.limit)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get the most recent weight or height, optionally converted to another unit")]
    fn get_latest_body_metric(&self, Parameters(p): Parameters<GetLatestBodyMetricParams>) -> Result<CallToolResult, McpError> {
        let result = body_metrics::get_latest_body_metric(&self.database, &self.converter, &p.kind, p.unit.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(latest) => to_json(&latest),
            None => to_json(&serde_json::json!({"error": "No records", "kind": p.kind})),
        }
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for MacroJournalService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "macrojournal".into(),
                version: crate::build_info::BuildInfo::current().full_version(),
                title: Some("Macro Journal".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Macro Journal - food logging against daily macro targets. \
                 Units: convert_units, resolve_servings. \
                 Food: add/get/search/update/delete_food_item. \
                 Days: get_or_create_day, get_day, delete_day. \
                 Meals are addressed by date and position: add_meal, rename_meal, delete_meal. \
                 Logging: log_food (quantity in any compatible unit or 'servings'), remove_consumed_item. \
                 Logged items keep their macros when a food item changes unless update_food_item is called with update_existing_entries=true. \
                 Targets: set_macro_targets, get_macro_targets. \
                 Body: record_body_metric, get_body_metrics, get_latest_body_metric."
                    .into(),
            ),
        }
    }
}
