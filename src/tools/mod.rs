//! Macro Journal Tools module
//!
//! Use-case functions behind the MCP tools. Each returns a serializable
//! response or an error message.

pub mod body_metrics;
pub mod food_items;
pub mod journal;
pub mod targets;
pub mod units;

use chrono::{Local, NaiveDate};

use crate::nutrition::{ConsumedUnit, Unit};

/// Parse an ISO date, defaulting to today
pub(crate) fn parse_date(date: Option<&str>) -> Result<String, String> {
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .map(|d| d.format("%Y-%m-%d").to_string())
            .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", d)),
        None => Ok(Local::now().date_naive().format("%Y-%m-%d").to_string()),
    }
}

pub(crate) fn parse_unit(unit: &str) -> Result<Unit, String> {
    Unit::from_str(unit).ok_or_else(|| {
        tracing::warn!("Rejected unknown unit '{}'", unit);
        format!("Unknown unit '{}'", unit)
    })
}

pub(crate) fn parse_consumed_unit(unit: &str) -> Result<ConsumedUnit, String> {
    ConsumedUnit::from_str(unit).ok_or_else(|| {
        tracing::warn!("Rejected unknown unit '{}'", unit);
        format!("Unknown unit '{}' (use a unit token or 'servings')", unit)
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::db::{migrations::run_migrations, Database};

    pub fn database() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            run_migrations(conn)?;
            Ok(())
        })
        .unwrap();
        db
    }

    pub fn meals() -> Vec<String> {
        vec!["Breakfast".to_string(), "Lunch".to_string(), "Dinner".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date(Some(" 2025-01-09 ")).unwrap(), "2025-01-09");
        assert!(parse_date(Some("2025-02-30")).is_err());
        assert!(parse_date(Some("09/01/2025")).is_err());
        assert_eq!(parse_date(None).unwrap().len(), 10);
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_unit("grams").unwrap(), Unit::Grams);
        assert!(parse_unit("stone").is_err());
        assert_eq!(parse_consumed_unit("servings").unwrap(), ConsumedUnit::Servings);
    }
}
