//! Revisium CLI
//!
//! Library half of the `revisium` binary: configuration loading, file
//! reading and the subcommands, kept apart from argument parsing so they
//! can be tested directly.

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod commands;
mod config;

use std::path::Path;

use anyhow::Context;
use revisium_schema::JsonSchema;
use serde_json::Value;

// Re-exports
pub use commands::{diff, inspect, normalize, Normalized};
pub use config::CliConfig;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Read a JSON file
///
/// # Errors
/// Returns an error when the file cannot be read or is not JSON.
pub fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Read a JSON Schema file
///
/// # Errors
/// Returns an error when the file cannot be read or is not a supported schema.
pub fn read_schema(path: &Path) -> anyhow::Result<JsonSchema> {
    let value = read_json(path)?;
    JsonSchema::from_value(value).with_context(|| format!("invalid schema in {}", path.display()))
}
