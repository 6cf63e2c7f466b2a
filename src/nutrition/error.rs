//! Nutrition error types

use thiserror::Error;

use super::units::Unit;

/// Errors produced by the nutrition computation core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NutritionError {
    #[error("Cannot convert between {from} and {to}")]
    IncompatibleUnits { from: String, to: String },

    #[error("Serving size must be greater than 0 (got {0})")]
    InvalidServingSize(f64),

    #[error("Batch write failed, no entries were changed: {0}")]
    PartialWrite(String),

    #[error("Food item not found with id: {0}")]
    FoodItemNotFound(i64),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl NutritionError {
    pub fn incompatible(from: impl ToString, to: Unit) -> Self {
        NutritionError::IncompatibleUnits {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl From<crate::db::DbError> for NutritionError {
    fn from(err: crate::db::DbError) -> Self {
        NutritionError::Storage(err.to_string())
    }
}

/// Result type for nutrition operations
pub type NutritionResult<T> = Result<T, NutritionError>;
