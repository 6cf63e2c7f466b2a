//! Unit conversion
//!
//! Converts quantities between units of the same dimension using a table of
//! per-direction multipliers. The multipliers are independently rounded, so a
//! conversion followed by its inverse is close to, not exactly, the input.

use std::collections::HashMap;

use super::error::{NutritionError, NutritionResult};
use super::units::Unit;

/// Round to 2 decimal places, half-up, nudged by epsilon so values like
/// 1.005 that land just under the midpoint in binary still round up.
pub fn round2(value: f64) -> f64 {
    ((value + f64::EPSILON) * 100.0).round() / 100.0
}

/// Sparse mapping of (from, to) unit pairs to multipliers
#[derive(Debug, Clone)]
pub struct ConversionTable {
    multipliers: HashMap<(Unit, Unit), f64>,
}

impl ConversionTable {
    /// Build a table from explicit entries (later duplicates win)
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Unit, Unit, f64)>,
    {
        let multipliers = entries
            .into_iter()
            .map(|(from, to, factor)| ((from, to), factor))
            .collect();
        Self { multipliers }
    }

    /// The default table used by the journal
    pub fn standard() -> Self {
        use Unit::*;

        Self::from_entries([
            // Mass
            (Grams, Ounces, 0.035),
            (Grams, Pounds, 0.0022),
            (Grams, Kilograms, 0.001),
            (Ounces, Grams, 28.35),
            (Ounces, Pounds, 0.0625),
            (Ounces, Kilograms, 0.0283),
            (Pounds, Grams, 453.59),
            (Pounds, Ounces, 16.0),
            (Pounds, Kilograms, 0.4536),
            (Kilograms, Grams, 1000.0),
            (Kilograms, Ounces, 35.274),
            (Kilograms, Pounds, 2.2046),
            // Length
            (Feet, Inches, 12.0),
            (Feet, Centimeters, 30.48),
            (Inches, Feet, 0.0833),
            (Inches, Centimeters, 2.54),
            (Centimeters, Feet, 0.0328),
            (Centimeters, Inches, 0.3937),
            // Volume
            (FluidOunces, Liters, 0.03),
            (FluidOunces, Cups, 0.125),
            (FluidOunces, Tablespoons, 2.0),
            (FluidOunces, Teaspoons, 6.0),
            (Liters, FluidOunces, 33.814),
            (Liters, Cups, 4.2268),
            (Liters, Tablespoons, 67.628),
            (Liters, Teaspoons, 202.884),
            (Cups, FluidOunces, 8.0),
            (Cups, Liters, 0.2366),
            (Cups, Tablespoons, 16.0),
            (Cups, Teaspoons, 48.0),
            (Tablespoons, FluidOunces, 0.5),
            (Tablespoons, Liters, 0.0148),
            (Tablespoons, Cups, 0.0625),
            (Tablespoons, Teaspoons, 3.0),
            (Teaspoons, FluidOunces, 0.1667),
            (Teaspoons, Liters, 0.0049),
            (Teaspoons, Cups, 0.0208),
            (Teaspoons, Tablespoons, 0.3333),
        ])
    }

    pub fn multiplier(&self, from: Unit, to: Unit) -> Option<f64> {
        self.multipliers.get(&(from, to)).copied()
    }

    pub fn len(&self) -> usize {
        self.multipliers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.multipliers.is_empty()
    }
}

impl Default for ConversionTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Converts quantities using an injected [`ConversionTable`]
#[derive(Debug, Clone, Default)]
pub struct UnitConverter {
    table: ConversionTable,
}

impl UnitConverter {
    pub fn new(table: ConversionTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ConversionTable {
        &self.table
    }

    /// Convert `quantity` from one unit to another.
    ///
    /// Same-unit conversion returns the quantity untouched. Any other pair
    /// must have a table entry, and the result is rounded to 2 decimals.
    pub fn convert(&self, quantity: f64, from: Unit, to: Unit) -> NutritionResult<f64> {
        if from == to {
            return Ok(quantity);
        }

        let factor = self
            .table
            .multiplier(from, to)
            .ok_or_else(|| NutritionError::incompatible(from, to))?;

        let converted = round2(quantity * factor);
        tracing::debug!("Converted {} {} -> {} {}", quantity, from, converted, to);
        Ok(converted)
    }
}
