//! Body Metric MCP Tools
//!
//! Weight and height history.

use serde::Serialize;

use crate::db::Database;
use crate::models::{BodyMetric, BodyMetricCreate, MetricKind};
use crate::nutrition::{Unit, UnitConverter};
use super::{parse_date, parse_unit};

/// Response for get_body_metrics
#[derive(Debug, Serialize)]
pub struct BodyMetricHistoryResponse {
    pub kind: MetricKind,
    pub records: Vec<BodyMetric>,
    pub count: usize,
}

/// Response for get_latest_body_metric
#[derive(Debug, Serialize)]
pub struct LatestBodyMetricResponse {
    pub record: BodyMetric,
    /// The record's value in the requested unit
    pub value: f64,
    pub unit: Unit,
}

pub(crate) fn parse_kind(kind: &str) -> Result<MetricKind, String> {
    MetricKind::from_str(kind).ok_or_else(|| format!("Unknown body metric '{}' (use weight or height)", kind))
}

pub fn record_body_metric(
    db: &Database,
    kind: &str,
    value: f64,
    unit: &str,
    date: Option<&str>,
    notes: Option<String>,
) -> Result<BodyMetric, String> {
    let kind = parse_kind(kind)?;
    let unit = parse_unit(unit)?;
    if !(value > 0.0) || !value.is_finite() {
        return Err(format!("{} must be greater than 0", kind.as_str()));
    }
    kind.check_unit(unit).map_err(|e| {
        tracing::warn!("Rejected {} in {}", kind.as_str(), unit);
        e.to_string()
    })?;

    let recorded_on = parse_date(date)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let metric = BodyMetric::create(&conn, &BodyMetricCreate {
        kind,
        value,
        unit,
        recorded_on,
        notes,
    })
    .map_err(|e| format!("Failed to record {}: {}", kind.as_str(), e))?;

    tracing::info!("Recorded {} {} {} on {}", metric.kind.as_str(), metric.value, metric.unit, metric.recorded_on);
    Ok(metric)
}

pub fn get_body_metrics(db: &Database, kind: &str, limit: i64) -> Result<BodyMetricHistoryResponse, String> {
    let kind = parse_kind(kind)?;
    let limit = limit.min(500).max(1);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let records = BodyMetric::history(&conn, kind, limit)
        .map_err(|e| format!("Failed to get {} history: {}", kind.as_str(), e))?;
    let count = records.len();

    Ok(BodyMetricHistoryResponse { kind, records, count })
}

/// Most recent record, converted to `unit` when given
pub fn get_latest_body_metric(
    db: &Database,
    converter: &UnitConverter,
    kind: &str,
    unit: Option<&str>,
) -> Result<Option<LatestBodyMetricResponse>, String> {
    let kind = parse_kind(kind)?;
    let target_unit = unit.map(parse_unit).transpose()?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let record = match BodyMetric::latest(&conn, kind)
        .map_err(|e| format!("Failed to get latest {}: {}", kind.as_str(), e))?
    {
        Some(record) => record,
        None => return Ok(None),
    };

    let unit = target_unit.unwrap_or(record.unit);
    let value = converter
        .convert(record.value, record.unit, unit)
        .map_err(|e| e.to_string())?;

    Ok(Some(LatestBodyMetricResponse { record, value, unit }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::database;

    #[test]
    fn test_record_and_latest() {
        let db = database();
        let converter = UnitConverter::default();

        record_body_metric(&db, "weight", 80.0, "kg", Some("2025-01-01"), None).unwrap();
        record_body_metric(&db, "weight", 79.0, "kg", Some("2025-01-08"), Some("after holidays".to_string())).unwrap();

        let latest = get_latest_body_metric(&db, &converter, "weight", Some("lb")).unwrap().unwrap();
        assert_eq!(latest.record.value, 79.0);
        assert_eq!(latest.unit, Unit::Pounds);
        assert!((latest.value - 174.16).abs() < 0.01);

        let same = get_latest_body_metric(&db, &converter, "weight", None).unwrap().unwrap();
        assert_eq!(same.value, 79.0);

        assert!(get_latest_body_metric(&db, &converter, "height", None).unwrap().is_none());
        assert!(get_latest_body_metric(&db, &converter, "weight", Some("cm")).is_err());

        let history = get_body_metrics(&db, "weight", 10).unwrap();
        assert_eq!(history.count, 2);
        assert_eq!(history.records[0].recorded_on, "2025-01-08");
    }

    #[test]
    fn test_record_rejects_wrong_dimension() {
        let db = database();
        let err = record_body_metric(&db, "height", 180.0, "kg", None, None).unwrap_err();
        assert!(err.contains("kg"));
        assert!(record_body_metric(&db, "height", 180.0, "cm", None, None).is_ok());
        assert!(record_body_metric(&db, "waist", 80.0, "cm", None, None).is_err());
    }
}
