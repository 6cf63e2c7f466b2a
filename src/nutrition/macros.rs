//! Macro aggregation
//!
//! Snapshots the macros of a single consumption, rolls snapshots up across a
//! day's meals, and compares the rollup with a target.
//!
//! Sugar and fiber are optional throughout: a food item or target may simply
//! not track them. Snapshots keep that absence. The daily rollup counts an
//! untracked item as 0 so one gap does not blank out an otherwise tracked day.

use serde::{Deserialize, Serialize};

use super::servings::ServingDefinition;
use super::units::Unit;
use crate::models::Meal;

/// Per-serving nutrition facts of a food item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    pub serving_size: f64,
    pub serving_unit: Unit,
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    #[serde(default)]
    pub sugar: Option<f64>,
    #[serde(default)]
    pub fiber: Option<f64>,
}

impl NutritionFacts {
    pub fn serving(&self) -> ServingDefinition {
        ServingDefinition {
            serving_size: self.serving_size,
            serving_unit: self.serving_unit,
        }
    }

    /// Macros contained in one serving
    pub fn per_serving(&self) -> Macros {
        Macros {
            calories: self.calories,
            carbs: self.carbs,
            protein: self.protein,
            fat: self.fat,
            sugar: self.sugar,
            fiber: self.fiber,
        }
    }
}

/// A set of macro amounts with optional sugar and fiber.
///
/// Used for consumed snapshots and for target definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    #[serde(default)]
    pub sugar: Option<f64>,
    #[serde(default)]
    pub fiber: Option<f64>,
}

impl Macros {
    /// Scale every tracked value; untracked values stay untracked
    pub fn scale(&self, multiplier: f64) -> Self {
        Self {
            calories: self.calories * multiplier,
            carbs: self.carbs * multiplier,
            protein: self.protein * multiplier,
            fat: self.fat * multiplier,
            sugar: self.sugar.map(|v| v * multiplier),
            fiber: self.fiber.map(|v| v * multiplier),
        }
    }
}

/// Rolled-up macros; every field is concrete
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub sugar: f64,
    pub fiber: f64,
}

impl MacroTotals {
    pub fn zero() -> Self {
        Self::default()
    }
}

impl From<&Macros> for MacroTotals {
    fn from(m: &Macros) -> Self {
        Self {
            calories: m.calories,
            carbs: m.carbs,
            protein: m.protein,
            fat: m.fat,
            sugar: m.sugar.unwrap_or(0.0),
            fiber: m.fiber.unwrap_or(0.0),
        }
    }
}

impl std::ops::Add for MacroTotals {
    type Output = MacroTotals;

    fn add(self, other: MacroTotals) -> MacroTotals {
        MacroTotals {
            calories: self.calories + other.calories,
            carbs: self.carbs + other.carbs,
            protein: self.protein + other.protein,
            fat: self.fat + other.fat,
            sugar: self.sugar + other.sugar,
            fiber: self.fiber + other.fiber,
        }
    }
}

impl std::iter::Sum for MacroTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(MacroTotals::zero(), |acc, m| acc + m)
    }
}

/// Remaining amount of an optional nutrient.
///
/// Serializes as a number, or `null` when the target does not track the
/// nutrient. `NotApplicable` is never the same as `Value(0.0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Remaining {
    Value(f64),
    NotApplicable,
}

impl Remaining {
    pub fn value(&self) -> Option<f64> {
        match self {
            Remaining::Value(v) => Some(*v),
            Remaining::NotApplicable => None,
        }
    }
}

/// Target minus consumed. Required fields may go negative when a target is
/// exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RemainingMacros {
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub sugar: Remaining,
    pub fiber: Remaining,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroStats {
    pub consumed: MacroTotals,
    pub remaining: RemainingMacros,
}

/// Absolute macros for eating `servings` of an item
pub fn compute_consumed_macros(facts: &NutritionFacts, servings: f64) -> Macros {
    facts.per_serving().scale(servings)
}

/// Total of every consumed item across `meals`
pub fn sum_macros(meals: &[Meal]) -> MacroTotals {
    meals
        .iter()
        .flat_map(|meal| meal.items.iter())
        .map(|item| MacroTotals::from(&item.macros))
        .sum()
}

/// Consumed and remaining macros for a day against `target`
pub fn compute_stats(target: &Macros, meals: &[Meal]) -> MacroStats {
    let consumed = sum_macros(meals);

    let optional = |target: Option<f64>, consumed: f64| match target {
        Some(t) => Remaining::Value(t - consumed),
        None => Remaining::NotApplicable,
    };

    let remaining = RemainingMacros {
        calories: target.calories - consumed.calories,
        carbs: target.carbs - consumed.carbs,
        protein: target.protein - consumed.protein,
        fat: target.fat - consumed.fat,
        sugar: optional(target.sugar, consumed.sugar),
        fiber: optional(target.fiber, consumed.fiber),
    };

    MacroStats { consumed, remaining }
}
