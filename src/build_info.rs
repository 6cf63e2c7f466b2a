//! Build metadata stamped by `build.rs`

use serde::Serialize;

/// Package version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const BUILD_NUMBER_RAW: Option<&str> = option_env!("MACROJOURNAL_BUILD_NUMBER");

/// Build timestamp in ISO 8601 format
pub const BUILD_TIMESTAMP: &str = match option_env!("MACROJOURNAL_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: VERSION,
            build_number: BUILD_NUMBER_RAW.and_then(|s| s.parse().ok()).unwrap_or(0),
            build_timestamp: BUILD_TIMESTAMP,
        }
    }

    /// Version with the build number appended, e.g. `1.0.0+42`
    pub fn full_version(&self) -> String {
        format!("{}+{}", self.version, self.build_number)
    }
}

/// Print the startup banner to stderr
pub fn print_startup_banner() {
    let info = BuildInfo::current();
    eprintln!("===============================================");
    eprintln!("  Macro Journal");
    eprintln!("  Version: {} | Build: {}", info.version, info.build_number);
    eprintln!("  Compiled: {}", info.build_timestamp);
    eprintln!("===============================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_version() {
        let info = BuildInfo {
            version: "1.0.0",
            build_number: 7,
            build_timestamp: "unknown",
        };
        assert_eq!(info.full_version(), "1.0.0+7");
        assert_eq!(BuildInfo::current().version, VERSION);
    }
}
