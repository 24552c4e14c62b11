//! CLI configuration file

use std::path::Path;

use anyhow::Context;
use revisium_schema::FactoryConfig;
use revisium_value::ValueConfig;
use serde::{Deserialize, Serialize};

/// Settings read from `--config <file.toml>`
///
/// ```toml
/// [factory]
/// max_depth = 32
/// system_refs = true
///
/// [value]
/// foreign_keys_required = false
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Schema tree construction
    pub factory: FactoryConfig,
    /// Row value trees
    pub value: ValueConfig,
}

impl CliConfig {
    /// Parse TOML text
    ///
    /// # Errors
    /// Returns an error for malformed TOML or unknown value types.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Read a TOML file
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }
}
