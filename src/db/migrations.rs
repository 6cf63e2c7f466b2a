//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!("Applied schema migration v1");
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- FOOD ITEMS
        -- Per-serving nutrition facts
        -- ============================================
        CREATE TABLE food_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            brand TEXT,
            serving_size REAL NOT NULL CHECK(serving_size > 0),
            serving_unit TEXT NOT NULL CHECK(serving_unit IN
                ('g', 'oz', 'lb', 'kg', 'ft', 'in', 'cm', 'floz', 'l', 'cup', 'tbsp', 'tsp')),

            calories REAL NOT NULL DEFAULT 0,
            carbs REAL NOT NULL DEFAULT 0,       -- grams
            protein REAL NOT NULL DEFAULT 0,     -- grams
            fat REAL NOT NULL DEFAULT 0,         -- grams
            sugar REAL,                          -- grams, NULL = not tracked
            fiber REAL,                          -- grams, NULL = not tracked

            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_food_items_name ON food_items(name);

        -- ============================================
        -- JOURNAL ENTRIES
        -- One per calendar day
        -- ============================================
        CREATE TABLE journal_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL UNIQUE,           -- ISO date: "2025-01-09"
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- MEALS
        -- Named, ordered groups within a day
        -- ============================================
        CREATE TABLE meals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            journal_entry_id INTEGER NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            meal_order INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),

            UNIQUE(journal_entry_id, meal_order)
        );

        CREATE INDEX idx_meals_entry ON meals(journal_entry_id);

        -- ============================================
        -- CONSUMED FOOD ITEMS
        -- Frozen snapshots of what was eaten
        -- ============================================
        CREATE TABLE consumed_food_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            meal_id INTEGER NOT NULL REFERENCES meals(id) ON DELETE CASCADE,
            food_item_id INTEGER NOT NULL REFERENCES food_items(id) ON DELETE RESTRICT,
            name TEXT NOT NULL,

            quantity REAL NOT NULL,              -- as entered
            unit TEXT NOT NULL,                  -- as entered, may be 'servings'
            servings REAL NOT NULL,
            consumed_quantity REAL NOT NULL,     -- for display
            consumed_unit TEXT NOT NULL,

            -- Absolute macros at the time of logging
            calories REAL NOT NULL,
            carbs REAL NOT NULL,
            protein REAL NOT NULL,
            fat REAL NOT NULL,
            sugar REAL,
            fiber REAL,

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_consumed_meal ON consumed_food_items(meal_id);
        CREATE INDEX idx_consumed_food ON consumed_food_items(food_item_id);

        -- ============================================
        -- MACRO TARGETS
        -- Append-only, versioned by start date
        -- ============================================
        CREATE TABLE macro_targets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            start_date TEXT,                     -- NULL = original definition
            calories REAL NOT NULL,
            carbs REAL NOT NULL,
            protein REAL NOT NULL,
            fat REAL NOT NULL,
            sugar REAL,
            fiber REAL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_macro_targets_start ON macro_targets(start_date);

        -- ============================================
        -- BODY METRICS
        -- Weight and height history
        -- ============================================
        CREATE TABLE body_metrics (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL CHECK(kind IN ('weight', 'height')),
            value REAL NOT NULL,
            unit TEXT NOT NULL,
            recorded_on TEXT NOT NULL,           -- ISO date
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_body_metrics_kind ON body_metrics(kind, recorded_on);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());
    }
}
