//! Build script for Macro Journal
//!
//! Stamps a build number and timestamp into the binary.

use std::fs;
use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=src");

    let counter = Path::new("build_number.txt");

    let previous: u64 = fs::read_to_string(counter)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0);
    let build = previous + 1;

    // A read-only checkout still builds, it just does not advance the counter
    if let Err(e) = fs::write(counter, build.to_string()) {
        println!("cargo:warning=Could not update build number: {}", e);
    }

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    println!("cargo:rustc-env=MACROJOURNAL_BUILD_NUMBER={}", build);
    println!("cargo:rustc-env=MACROJOURNAL_BUILD_TIMESTAMP={}", timestamp);
}
