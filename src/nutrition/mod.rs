//! Nutrition calculation module
//!
//! Unit conversion, serving resolution, and macro aggregation.

pub mod converter;
pub mod error;
pub mod macros;
pub mod propagate;
pub mod servings;
pub mod units;

pub use converter::{round2, ConversionTable, UnitConverter};
pub use error::{NutritionError, NutritionResult};
pub use macros::{
    compute_consumed_macros, compute_stats, sum_macros, MacroStats, MacroTotals, Macros,
    NutritionFacts, Remaining, RemainingMacros,
};
pub use propagate::{
    plan_snapshot_updates, propagate_update, AffectedEntry, EntryPath, JournalStore,
    PropagationReport, SnapshotUpdate,
};
pub use servings::{resolve_servings, ServingDefinition, ServingResolution};
pub use units::{ConsumedUnit, Dimension, Unit};
