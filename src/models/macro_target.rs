//! Macro Target model
//!
//! Daily nutrition goals, versioned by start date. Definitions are only ever
//! appended: changing a goal pushes a new definition starting on a date, and
//! days before that date keep being measured against the older one.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::nutrition::Macros;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroTarget {
    pub id: i64,
    /// ISO date the definition applies from. `None` is the original definition.
    pub start_date: Option<String>,
    pub targets: Macros,
    pub created_at: String,
}

impl MacroTarget {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            start_date: row.get("start_date")?,
            targets: Macros {
                calories: row.get("calories")?,
                carbs: row.get("carbs")?,
                protein: row.get("protein")?,
                fat: row.get("fat")?,
                sugar: row.get("sugar")?,
                fiber: row.get("fiber")?,
            },
            created_at: row.get("created_at")?,
        })
    }

    fn create(conn: &Connection, start_date: Option<&str>, targets: &Macros) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO macro_targets (start_date, calories, carbs, protein, fat, sugar, fiber)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                start_date,
                targets.calories,
                targets.carbs,
                targets.protein,
                targets.fat,
                targets.sugar,
                targets.fiber,
            ],
        )?;

        let id = conn.last_insert_rowid();
        let mut stmt = conn.prepare("SELECT * FROM macro_targets WHERE id = ?1")?;
        match stmt.query_row([id], Self::from_row) {
            Ok(target) => Ok(target),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(DbError::NotFound(format!("Macro target {}", id))),
            Err(e) => Err(e.into()),
        }
    }

    /// All definitions, newest first
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM macro_targets ORDER BY COALESCE(start_date, '') DESC, id DESC",
        )?;

        let targets = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(targets)
    }

    /// Definition in effect on `date`
    pub fn effective_on(conn: &Connection, date: &str) -> DbResult<Option<Self>> {
        let definitions = Self::list(conn)?;
        Ok(current_at(&definitions, date).cloned())
    }

    /// Push `targets` as a new definition starting on `start_date`, unless it
    /// matches the definition already in effect on that date. The very first
    /// definition is stored as the original one with no start date.
    ///
    /// Returns the effective definition and whether a new one was pushed.
    pub fn push_if_changed(conn: &Connection, targets: &Macros, start_date: &str) -> DbResult<(Self, bool)> {
        let definitions = Self::list(conn)?;

        if definitions.is_empty() {
            let created = Self::create(conn, None, targets)?;
            tracing::info!("Stored original macro targets");
            return Ok((created, true));
        }

        if let Some(current) = current_at(&definitions, start_date) {
            if same_targets(&current.targets, targets) {
                return Ok((current.clone(), false));
            }
        }

        let created = Self::create(conn, Some(start_date), targets)?;
        tracing::info!("Pushed macro targets starting {}", start_date);
        Ok((created, true))
    }
}

/// The definition in effect on `date`: the latest one whose start date is on
/// or before `date`, falling back to the original (no start date) definition.
pub fn current_at<'a>(definitions: &'a [MacroTarget], date: &str) -> Option<&'a MacroTarget> {
    let dated = definitions
        .iter()
        .filter(|d| d.start_date.as_deref().map_or(false, |start| start <= date))
        .max_by(|a, b| (a.start_date.as_deref(), a.id).cmp(&(b.start_date.as_deref(), b.id)));

    dated.or_else(|| {
        definitions
            .iter()
            .filter(|d| d.start_date.is_none())
            .max_by_key(|d| d.id)
    })
}

/// Field-by-field equality over every target, including the optional ones
pub fn same_targets(a: &Macros, b: &Macros) -> bool {
    a.calories == b.calories
        && a.carbs == b.carbs
        && a.protein == b.protein
        && a.fat == b.fat
        && a.sugar == b.sugar
        && a.fiber == b.fiber
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

    fn targets(calories: f64, fiber: Option<f64>) -> Macros {
        Macros {
            calories,
            carbs: 200.0,
            protein: 150.0,
            fat: 70.0,
            sugar: None,
            fiber,
        }
    }

    fn definition(id: i64, start_date: Option<&str>) -> MacroTarget {
        MacroTarget {
            id,
            start_date: start_date.map(str::to_string),
            targets: targets(2000.0, None),
            created_at: String::new(),
        }
    }

    #[test]
    fn test_current_at_picks_latest_started() {
        let defs = vec![
            definition(1, None),
            definition(2, Some("2025-01-10")),
            definition(3, Some("2025-02-01")),
        ];

        assert_eq!(current_at(&defs, "2025-01-05").unwrap().id, 1);
        assert_eq!(current_at(&defs, "2025-01-10").unwrap().id, 2);
        assert_eq!(current_at(&defs, "2025-01-31").unwrap().id, 2);
        assert_eq!(current_at(&defs, "2025-06-01").unwrap().id, 3);
        assert!(current_at(&[], "2025-06-01").is_none());
    }

    #[test]
    fn test_same_day_change_wins_by_id() {
        let defs = vec![
            definition(1, None),
            definition(2, Some("2025-01-10")),
            definition(3, Some("2025-01-10")),
        ];
        assert_eq!(current_at(&defs, "2025-01-10").unwrap().id, 3);
    }

    #[test]
    fn test_equality_checks_every_field() {
        assert!(same_targets(&targets(2000.0, None), &targets(2000.0, None)));
        assert!(!same_targets(&targets(2000.0, None), &targets(2000.0, Some(30.0))));

        let mut fat_changed = targets(2000.0, None);
        fat_changed.fat = 60.0;
        assert!(!same_targets(&targets(2000.0, None), &fat_changed));
    }

    #[test]
    fn test_push_if_changed() {
        let conn = setup();

        let (first, pushed) = MacroTarget::push_if_changed(&conn, &targets(2000.0, None), "2025-01-01").unwrap();
        assert!(pushed);
        assert_eq!(first.start_date, None);

        let (same, pushed) = MacroTarget::push_if_changed(&conn, &targets(2000.0, None), "2025-01-05").unwrap();
        assert!(!pushed);
        assert_eq!(same.id, first.id);

        // Only the optional fiber target differs
        let (second, pushed) = MacroTarget::push_if_changed(&conn, &targets(2000.0, Some(30.0)), "2025-01-05").unwrap();
        assert!(pushed);
        assert_eq!(second.start_date.as_deref(), Some("2025-01-05"));

        assert_eq!(MacroTarget::list(&conn).unwrap().len(), 2);
        assert_eq!(MacroTarget::effective_on(&conn, "2025-01-04").unwrap().unwrap().id, first.id);
        assert_eq!(MacroTarget::effective_on(&conn, "2025-01-05").unwrap().unwrap().id, second.id);
    }
}
