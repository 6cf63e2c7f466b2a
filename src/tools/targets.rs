//! Macro Target MCP Tools

use serde::Serialize;

use crate::db::Database;
use crate::models::{current_at, MacroTarget};
use crate::nutrition::Macros;
use super::parse_date;

/// Response for set_macro_targets
#[derive(Debug, Serialize)]
pub struct SetMacroTargetsResponse {
    /// false when the values matched the definition already in effect
    pub created: bool,
    pub target: MacroTarget,
}

/// Response for get_macro_targets
#[derive(Debug, Serialize)]
pub struct GetMacroTargetsResponse {
    pub date: String,
    pub current: Option<MacroTarget>,
    /// Every definition, newest first
    pub history: Vec<MacroTarget>,
}

fn validate(targets: &Macros) -> Result<(), String> {
    let values = [
        ("calories", Some(targets.calories)),
        ("carbs", Some(targets.carbs)),
        ("protein", Some(targets.protein)),
        ("fat", Some(targets.fat)),
        ("sugar", targets.sugar),
        ("fiber", targets.fiber),
    ];

    for (name, value) in values {
        if value.map_or(false, |v| v < 0.0 || !v.is_finite()) {
            return Err(format!("{} target must be a non-negative number", name));
        }
    }
    Ok(())
}

/// Set the targets in effect from `start_date` (today by default)
pub fn set_macro_targets(
    db: &Database,
    targets: Macros,
    start_date: Option<&str>,
) -> Result<SetMacroTargetsResponse, String> {
    validate(&targets)?;
    let start_date = parse_date(start_date)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let (target, created) = MacroTarget::push_if_changed(&conn, &targets, &start_date)
        .map_err(|e| format!("Failed to set macro targets: {}", e))?;

    Ok(SetMacroTargetsResponse { created, target })
}

/// Targets in effect on `date` (today by default) plus the full history
pub fn get_macro_targets(db: &Database, date: Option<&str>) -> Result<GetMacroTargetsResponse, String> {
    let date = parse_date(date)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let history = MacroTarget::list(&conn)
        .map_err(|e| format!("Failed to list macro targets: {}", e))?;
    let current = current_at(&history, &date).cloned();

    Ok(GetMacroTargetsResponse { date, current, history })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::database;

    fn targets(protein: f64) -> Macros {
        Macros {
            calories: 2200.0,
            carbs: 220.0,
            protein,
            fat: 70.0,
            sugar: Some(50.0),
            fiber: Some(30.0),
        }
    }

    #[test]
    fn test_set_and_get_targets() {
        let db = database();

        let first = set_macro_targets(&db, targets(150.0), Some("2025-01-01")).unwrap();
        assert!(first.created);
        assert!(first.target.start_date.is_none());

        let unchanged = set_macro_targets(&db, targets(150.0), Some("2025-02-01")).unwrap();
        assert!(!unchanged.created);

        let changed = set_macro_targets(&db, targets(170.0), Some("2025-02-01")).unwrap();
        assert!(changed.created);

        let january = get_macro_targets(&db, Some("2025-01-15")).unwrap();
        assert_eq!(january.current.unwrap().targets.protein, 150.0);
        assert_eq!(january.history.len(), 2);
        assert_eq!(january.history[0].start_date.as_deref(), Some("2025-02-01"));

        let february = get_macro_targets(&db, Some("2025-02-01")).unwrap();
        assert_eq!(february.current.unwrap().targets.protein, 170.0);
    }

    #[test]
    fn test_rejects_negative_targets() {
        let db = database();
        let mut bad = targets(150.0);
        bad.fiber = Some(-5.0);
        assert!(set_macro_targets(&db, bad, None).is_err());
        assert!(get_macro_targets(&db, None).unwrap().current.is_none());
    }
}
