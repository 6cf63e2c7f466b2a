//! Serving resolution
//!
//! Turns "I ate this much of that" into a servings count relative to a food
//! item's serving definition.

use serde::{Deserialize, Serialize};

use super::converter::UnitConverter;
use super::error::{NutritionError, NutritionResult};
use super::units::{ConsumedUnit, Unit};

/// A food item's canonical serving: `size` of `unit`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServingDefinition {
    pub serving_size: f64,
    pub serving_unit: Unit,
}

/// Outcome of resolving a consumed quantity against a serving definition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServingResolution {
    pub servings: f64,
    /// Quantity to display for the consumption
    pub consumed_quantity: f64,
    /// Unit `consumed_quantity` is expressed in
    pub consumed_unit: Unit,
}

/// Resolve how many servings `quantity` of `unit` represents.
///
/// - `Servings`: the quantity is the servings count; the displayed quantity
///   is expressed in the item's serving unit.
/// - The item's own serving unit: divide by the serving size.
/// - Any other unit: convert into the serving unit first. The entered
///   quantity and unit are kept for display.
pub fn resolve_servings(
    converter: &UnitConverter,
    serving: &ServingDefinition,
    quantity: f64,
    unit: ConsumedUnit,
) -> NutritionResult<ServingResolution> {
    // NaN fails this check too
    if !(serving.serving_size > 0.0) {
        return Err(NutritionError::InvalidServingSize(serving.serving_size));
    }

    let resolution = match unit {
        ConsumedUnit::Servings => ServingResolution {
            servings: quantity,
            consumed_quantity: quantity * serving.serving_size,
            consumed_unit: serving.serving_unit,
        },
        ConsumedUnit::Unit(unit) if unit == serving.serving_unit => ServingResolution {
            servings: quantity / serving.serving_size,
            consumed_quantity: quantity,
            consumed_unit: unit,
        },
        ConsumedUnit::Unit(unit) => {
            let converted = converter.convert(quantity, unit, serving.serving_unit)?;
            ServingResolution {
                servings: converted / serving.serving_size,
                consumed_quantity: quantity,
                consumed_unit: unit,
            }
        }
    };

    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serving(size: f64, unit: Unit) -> ServingDefinition {
        ServingDefinition {
            serving_size: size,
            serving_unit: unit,
        }
    }

    #[test]
    fn test_servings_unit() {
        let c = UnitConverter::default();
        let r = resolve_servings(&c, &serving(30.0, Unit::Grams), 2.5, ConsumedUnit::Servings).unwrap();
        assert_eq!(r.servings, 2.5);
        assert_eq!(r.consumed_quantity, 75.0);
        assert_eq!(r.consumed_unit, Unit::Grams);
    }

    #[test]
    fn test_grams_to_servings() {
        let c = UnitConverter::default();
        let r = resolve_servings(&c, &serving(50.0, Unit::Grams), 120.0, Unit::Grams.into()).unwrap();
        assert_eq!(r.servings, 2.4);
        assert_eq!(r.consumed_quantity, 120.0);
        assert_eq!(r.consumed_unit, Unit::Grams);
    }

    #[test]
    fn test_same_unit_keeps_quantity_exact() {
        let c = UnitConverter::default();
        let r = resolve_servings(&c, &serving(3.0, Unit::Ounces), 1.23456, Unit::Ounces.into()).unwrap();
        assert_eq!(r.consumed_quantity, 1.23456);
    }

    #[test]
    fn test_converted_unit() {
        // 2 cups of a 1 floz serving item: 16 floz = 16 servings
        let c = UnitConverter::default();
        let r = resolve_servings(&c, &serving(1.0, Unit::FluidOunces), 2.0, Unit::Cups.into()).unwrap();
        assert_eq!(r.servings, 16.0);
        assert_eq!(r.consumed_quantity, 2.0);
        assert_eq!(r.consumed_unit, Unit::Cups);
    }

    #[test]
    fn test_converted_ounces_against_grams() {
        // 4 oz = 113.4 g, serving of 100 g
        let c = UnitConverter::default();
        let r = resolve_servings(&c, &serving(100.0, Unit::Grams), 4.0, Unit::Ounces.into()).unwrap();
        assert!((r.servings - 1.134).abs() < 1e-9);
    }

    #[test]
    fn test_zero_serving_size() {
        let c = UnitConverter::default();
        let err = resolve_servings(&c, &serving(0.0, Unit::Grams), 10.0, Unit::Grams.into()).unwrap_err();
        assert_eq!(err, NutritionError::InvalidServingSize(0.0));

        let err = resolve_servings(&c, &serving(-5.0, Unit::Grams), 1.0, ConsumedUnit::Servings).unwrap_err();
        assert_eq!(err, NutritionError::InvalidServingSize(-5.0));
    }

    #[test]
    fn test_incompatible_unit_passes_through() {
        let c = UnitConverter::default();
        let err = resolve_servings(&c, &serving(100.0, Unit::Grams), 1.0, Unit::Liters.into()).unwrap_err();
        assert_eq!(
            err,
            NutritionError::IncompatibleUnits {
                from: "l".to_string(),
                to: "g".to_string(),
            }
        );
    }
}
