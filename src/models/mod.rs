//! Data models
//!
//! Rust structs representing database entities.

mod body_metric;
mod consumed_food_item;
mod food_item;
mod journal_entry;
mod macro_target;
mod meal;

pub use body_metric::{BodyMetric, BodyMetricCreate, MetricKind};
pub use consumed_food_item::{ConsumedFoodItem, ConsumedFoodItemCreate};
pub use food_item::{FoodItem, FoodItemCreate, FoodItemField, FoodItemUpdate};
pub use journal_entry::JournalEntry;
pub use macro_target::{current_at, same_targets, MacroTarget};
pub use meal::Meal;
