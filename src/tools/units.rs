//! Unit MCP Tools
//!
//! Stateless conversion and serving resolution.

use serde::Serialize;

use crate::nutrition::{resolve_servings as resolve, ServingDefinition, Unit, UnitConverter};
use super::{parse_consumed_unit, parse_unit};

/// Response for convert_units
#[derive(Debug, Serialize)]
pub struct ConvertUnitsResponse {
    pub quantity: f64,
    pub from: Unit,
    pub to: Unit,
    pub result: f64,
}

/// Response for resolve_servings
#[derive(Debug, Serialize)]
pub struct ResolveServingsResponse {
    pub servings: f64,
    pub consumed_quantity: f64,
    pub consumed_unit: Unit,
}

pub fn convert_units(
    converter: &UnitConverter,
    quantity: f64,
    from: &str,
    to: &str,
) -> Result<ConvertUnitsResponse, String> {
    let from = parse_unit(from)?;
    let to = parse_unit(to)?;
    let result = converter.convert(quantity, from, to).map_err(|e| e.to_string())?;

    Ok(ConvertUnitsResponse { quantity, from, to, result })
}

pub fn resolve_servings(
    converter: &UnitConverter,
    serving_size: f64,
    serving_unit: &str,
    quantity: f64,
    unit: &str,
) -> Result<ResolveServingsResponse, String> {
    let serving = ServingDefinition {
        serving_size,
        serving_unit: parse_unit(serving_unit)?,
    };
    let unit = parse_consumed_unit(unit)?;

    let resolution = resolve(converter, &serving, quantity, unit).map_err(|e| e.to_string())?;

    Ok(ResolveServingsResponse {
        servings: resolution.servings,
        consumed_quantity: resolution.consumed_quantity,
        consumed_unit: resolution.consumed_unit,
    })
}
