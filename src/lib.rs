//! Macro Journal Library
//!
//! Food logging, macro targets, and body metrics over a SQLite journal.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
