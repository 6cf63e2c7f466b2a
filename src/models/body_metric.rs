//! Body Metric model
//!
//! Weight and height history. Each record keeps the unit it was entered in.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::nutrition::{Dimension, NutritionError, NutritionResult, Unit};
use super::food_item::unit_column;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Weight,
    Height,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Weight => "weight",
            MetricKind::Height => "height",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "weight" => Some(MetricKind::Weight),
            "height" => Some(MetricKind::Height),
            _ => None,
        }
    }

    /// Dimension a unit must have to record this kind
    pub fn dimension(&self) -> Dimension {
        match self {
            MetricKind::Weight => Dimension::Mass,
            MetricKind::Height => Dimension::Length,
        }
    }

    pub fn check_unit(&self, unit: Unit) -> NutritionResult<()> {
        if unit.dimension() == self.dimension() {
            return Ok(());
        }
        Err(NutritionError::IncompatibleUnits {
            from: unit.to_string(),
            to: self.as_str().to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyMetric {
    pub id: i64,
    pub kind: MetricKind,
    pub value: f64,
    pub unit: Unit,
    pub recorded_on: String,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct BodyMetricCreate {
    pub kind: MetricKind,
    pub value: f64,
    pub unit: Unit,
    pub recorded_on: String,
    pub notes: Option<String>,
}

fn kind_column(row: &Row, column: &str) -> rusqlite::Result<MetricKind> {
    let token: String = row.get(column)?;
    MetricKind::from_str(&token).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("unknown body metric '{}' in column {}", token, column).into(),
        )
    })
}

impl BodyMetric {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            kind: kind_column(row, "kind")?,
            value: row.get("value")?,
            unit: unit_column(row, "unit")?,
            recorded_on: row.get("recorded_on")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &BodyMetricCreate) -> DbResult<Self> {
        data.kind
            .check_unit(data.unit)
            .map_err(|e| DbError::Invalid(e.to_string()))?;

        conn.execute(
            "INSERT INTO body_metrics (kind, value, unit, recorded_on, notes) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                data.kind.as_str(),
                data.value,
                data.unit.as_str(),
                data.recorded_on,
                data.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        let mut stmt = conn.prepare("SELECT * FROM body_metrics WHERE id = ?1")?;
        match stmt.query_row([id], Self::from_row) {
            Ok(metric) => Ok(metric),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(DbError::NotFound(format!("Body metric {}", id))),
            Err(e) => Err(e.into()),
        }
    }

    /// History of one kind, most recent first
    pub fn history(conn: &Connection, kind: MetricKind, limit: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM body_metrics
            WHERE kind = ?1
            ORDER BY recorded_on DESC, id DESC
            LIMIT ?2
            "#,
        )?;

        let metrics = stmt
            .query_map(params![kind.as_str(), limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(metrics)
    }

    pub fn latest(conn: &Connection, kind: MetricKind) -> DbResult<Option<Self>> {
        Ok(Self::history(conn, kind, 1)?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn weight(value: f64, unit: Unit, date: &str) -> BodyMetricCreate {
        BodyMetricCreate {
            kind: MetricKind::Weight,
            value,
            unit,
            recorded_on: date.to_string(),
            notes: None,
        }
    }

    #[test]
    fn test_history_order() {
        let conn = setup();
        BodyMetric::create(&conn, &weight(180.0, Unit::Pounds, "2025-01-01")).unwrap();
        BodyMetric::create(&conn, &weight(81.0, Unit::Kilograms, "2025-02-01")).unwrap();
        BodyMetric::create(&conn, &weight(179.0, Unit::Pounds, "2025-01-15")).unwrap();

        let history = BodyMetric::history(&conn, MetricKind::Weight, 10).unwrap();
        let dates: Vec<&str> = history.iter().map(|m| m.recorded_on.as_str()).collect();
        assert_eq!(dates, vec!["2025-02-01", "2025-01-15", "2025-01-01"]);

        let latest = BodyMetric::latest(&conn, MetricKind::Weight).unwrap().unwrap();
        assert_eq!(latest.unit, Unit::Kilograms);
        assert!(BodyMetric::latest(&conn, MetricKind::Height).unwrap().is_none());
    }

    #[test]
    fn test_unknown_stored_kind_is_an_error() {
        let conn = setup();
        let kind = conn.query_row("SELECT 'height' AS kind", [], |row| kind_column(row, "kind")).unwrap();
        assert_eq!(kind, MetricKind::Height);

        let err = conn
            .query_row("SELECT 'waist' AS kind", [], |row| kind_column(row, "kind"))
            .unwrap_err();
        assert!(matches!(err, rusqlite::Error::FromSqlConversionFailure(..)));
        assert!(err.to_string().contains("waist"));
    }

    #[test]
    fn test_unit_must_match_kind() {
        let conn = setup();
        let err = BodyMetric::create(&conn, &weight(70.0, Unit::Centimeters, "2025-01-01"));
        assert!(matches!(err, Err(DbError::Invalid(_))));

        let height = BodyMetricCreate {
            kind: MetricKind::Height,
            value: 5.9,
            unit: Unit::Feet,
            recorded_on: "2025-01-01".to_string(),
            notes: None,
        };
        assert!(BodyMetric::create(&conn, &height).is_ok());
    }

    #[test]
    fn test_check_unit() {
        assert!(MetricKind::Weight.check_unit(Unit::Ounces).is_ok());
        assert!(MetricKind::Height.check_unit(Unit::Inches).is_ok());
        assert_eq!(
            MetricKind::Height.check_unit(Unit::Liters),
            Err(NutritionError::IncompatibleUnits { from: "l".to_string(), to: "height".to_string() })
        );
    }
}
