//! Unit types
//!
//! The closed set of measurement units a food item or a consumption can be
//! expressed in, grouped by physical dimension.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Physical dimension of a unit. Units only convert within one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Mass,
    Length,
    Volume,
}

/// A concrete unit of measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "g")]
    Grams,
    #[serde(rename = "oz")]
    Ounces,
    #[serde(rename = "lb")]
    Pounds,
    #[serde(rename = "kg")]
    Kilograms,
    #[serde(rename = "ft")]
    Feet,
    #[serde(rename = "in")]
    Inches,
    #[serde(rename = "cm")]
    Centimeters,
    #[serde(rename = "floz")]
    FluidOunces,
    #[serde(rename = "l")]
    Liters,
    #[serde(rename = "cup")]
    Cups,
    #[serde(rename = "tbsp")]
    Tablespoons,
    #[serde(rename = "tsp")]
    Teaspoons,
}

impl Unit {
    pub const ALL: [Unit; 12] = [
        Unit::Grams,
        Unit::Ounces,
        Unit::Pounds,
        Unit::Kilograms,
        Unit::Feet,
        Unit::Inches,
        Unit::Centimeters,
        Unit::FluidOunces,
        Unit::Liters,
        Unit::Cups,
        Unit::Tablespoons,
        Unit::Teaspoons,
    ];

    pub fn dimension(&self) -> Dimension {
        match self {
            Unit::Grams | Unit::Ounces | Unit::Pounds | Unit::Kilograms => Dimension::Mass,
            Unit::Feet | Unit::Inches | Unit::Centimeters => Dimension::Length,
            Unit::FluidOunces | Unit::Liters | Unit::Cups | Unit::Tablespoons | Unit::Teaspoons => {
                Dimension::Volume
            }
        }
    }

    /// Short token used in storage and tool payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Grams => "g",
            Unit::Ounces => "oz",
            Unit::Pounds => "lb",
            Unit::Kilograms => "kg",
            Unit::Feet => "ft",
            Unit::Inches => "in",
            Unit::Centimeters => "cm",
            Unit::FluidOunces => "floz",
            Unit::Liters => "l",
            Unit::Cups => "cup",
            Unit::Tablespoons => "tbsp",
            Unit::Teaspoons => "tsp",
        }
    }

    /// Parse a unit token or one of its common spellings
    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();

        match lower.as_str() {
            "g" | "gram" | "grams" => Some(Unit::Grams),
            "oz" | "ounce" | "ounces" => Some(Unit::Ounces),
            "lb" | "lbs" | "pound" | "pounds" => Some(Unit::Pounds),
            "kg" | "kilogram" | "kilograms" => Some(Unit::Kilograms),
            "ft" | "foot" | "feet" => Some(Unit::Feet),
            "in" | "inch" | "inches" => Some(Unit::Inches),
            "cm" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => {
                Some(Unit::Centimeters)
            }
            "floz" | "fl oz" | "fl. oz" | "fluid ounce" | "fluid ounces" => Some(Unit::FluidOunces),
            "l" | "liter" | "liters" | "litre" | "litres" => Some(Unit::Liters),
            "cup" | "cups" => Some(Unit::Cups),
            "tbsp" | "tablespoon" | "tablespoons" => Some(Unit::Tablespoons),
            "tsp" | "teaspoon" | "teaspoons" => Some(Unit::Teaspoons),
            _ => None,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unit a consumed quantity was entered in.
///
/// `Servings` means "N times the food item's serving size". It is never a
/// valid serving unit of a food item itself, which is why `FoodItem` stores a
/// plain [`Unit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsumedUnit {
    Servings,
    Unit(Unit),
}

impl ConsumedUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsumedUnit::Servings => "servings",
            ConsumedUnit::Unit(unit) => unit.as_str(),
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "serving" | "servings" => Some(ConsumedUnit::Servings),
            other => Unit::from_str(other).map(ConsumedUnit::Unit),
        }
    }
}

impl From<Unit> for ConsumedUnit {
    fn from(unit: Unit) -> Self {
        ConsumedUnit::Unit(unit)
    }
}

impl fmt::Display for ConsumedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ConsumedUnit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ConsumedUnit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ConsumedUnit::from_str(&s).ok_or_else(|| de::Error::custom(format!("unknown unit: {}", s)))
    }
}
