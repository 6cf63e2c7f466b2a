//! Runtime configuration from the environment

use std::path::PathBuf;

/// Meals created for every new journal entry unless overridden
pub const DEFAULT_MEALS: [&str; 4] = ["Breakfast", "Lunch", "Dinner", "Snacks"];

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub default_meals: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let database_path = std::env::var("MACROJOURNAL_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_database_path());

        let default_meals = std::env::var("MACROJOURNAL_DEFAULT_MEALS")
            .ok()
            .map(|v| parse_meal_list(&v))
            .filter(|meals| !meals.is_empty())
            .unwrap_or_else(|| DEFAULT_MEALS.iter().map(|m| m.to_string()).collect());

        Self {
            database_path,
            default_meals,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            default_meals: DEFAULT_MEALS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// `data/macrojournal.db` under the project root, found from the executable
fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("macrojournal.db");
    path
}

/// Split a comma-separated meal list, dropping blanks
fn parse_meal_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_meal_list() {
        assert_eq!(
            parse_meal_list(" Breakfast, ,Second breakfast ,Dinner"),
            vec!["Breakfast", "Second breakfast", "Dinner"]
        );
        assert!(parse_meal_list(" , ").is_empty());
    }

    #[test]
    fn test_default_path() {
        let config = Config::default();
        assert!(config.database_path.ends_with("data/macrojournal.db"));
        assert_eq!(config.default_meals.len(), 4);
    }
}
