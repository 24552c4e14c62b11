//! Subcommand implementations, free of file and terminal I/O

use std::fmt::Write as _;

use anyhow::Context;
use revisium_draft::RootNodeStore;
use revisium_schema::{
    collect_foreign_keys, traverse_schema, JsonPatch, JsonSchema, SchemaStoreFactory,
};
use revisium_value::{validation_issues, ValidationIssue, ValueTree};
use serde_json::Value;

use crate::config::CliConfig;

/// Result of `revisium normalize`
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// Row in priority order
    pub value: Value,
    /// Why the row is invalid, empty when valid
    pub issues: Vec<ValidationIssue>,
}

impl Normalized {
    /// No validation issues
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// One line per schema node: pointer, type and flags
///
/// # Errors
/// Returns an error when the schema tree cannot be built.
pub fn inspect(schema: &JsonSchema, config: &CliConfig) -> anyhow::Result<String> {
    let node = SchemaStoreFactory::new(config.factory)
        .build(schema)
        .context("failed to build schema")?;

    let mut out = String::new();
    traverse_schema(&node, |node, pointer| {
        let path = if pointer.is_empty() {
            "/".to_string()
        } else {
            pointer.to_string()
        };
        let _ = write!(out, "{path}\t{}", node.schema_type());
        if let Some(uri) = node.reference() {
            let _ = write!(out, "\t$ref={uri}");
        }
        if let Some(table) = node.foreign_key() {
            let _ = write!(out, "\tforeignKey={table}");
        }
        if node.is_read_only() {
            out.push_str("\treadOnly");
        }
        if node.is_deprecated() {
            out.push_str("\tdeprecated");
        }
        out.push('\n');
    });

    let tables = collect_foreign_keys(&node);
    if !tables.is_empty() {
        let _ = writeln!(out, "foreign keys: {}", tables.join(", "));
    }
    Ok(out)
}

/// Hydrate `row` against `schema` and export it sorted
///
/// # Errors
/// Returns an error when the schema tree cannot be built.
pub fn normalize(schema: &JsonSchema, row: &Value, config: &CliConfig) -> anyhow::Result<Normalized> {
    let node = SchemaStoreFactory::new(config.factory)
        .build(schema)
        .context("failed to build schema")?;

    let mut tree = ValueTree::with_config(node, config.value);
    let root = tree.root();
    tree.update_base_value(root, row)?;

    let store = tree.root_store();
    Ok(Normalized {
        value: store.to_sorted_json_value(),
        issues: validation_issues(store),
    })
}

/// Patches staging `new` onto an editor loaded with `old`
///
/// # Errors
/// Returns an error when staging fails.
pub fn diff(old: &JsonSchema, new: &JsonSchema) -> anyhow::Result<Vec<JsonPatch>> {
    let mut store = RootNodeStore::from_schema(old);
    store
        .stage_schema(new)
        .context("failed to stage target schema")?;
    let patches = store.get_patches();
    tracing::info!("Schema diff has {} operations", patches.len());
    Ok(patches)
}
