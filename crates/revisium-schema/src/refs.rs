//! Ref table
//!
//! Shared schema definitions addressed by `$ref`. The data store ships a
//! fixed set of system schemas (row id, timestamps, files) that tables
//! embed by reference.

use std::collections::HashMap;

use crate::json_schema::{
    JsonNumberSchema, JsonObjectSchema, JsonSchema, JsonStringSchema, SchemaMeta,
};

/// URIs of the built-in system schemas
pub mod system {
    /// Row id
    pub const ROW_ID: &str = "urn:jsonschema:io:revisium:row-id-schema:1.0.0";
    /// Row creation timestamp
    pub const ROW_CREATED_AT: &str = "urn:jsonschema:io:revisium:row-created-at-schema:1.0.0";
    /// Row update timestamp
    pub const ROW_UPDATED_AT: &str = "urn:jsonschema:io:revisium:row-updated-at-schema:1.0.0";
    /// Row version id
    pub const ROW_VERSION_ID: &str = "urn:jsonschema:io:revisium:row-version-id-schema:1.0.0";
    /// Uploaded file
    pub const FILE: &str = "urn:jsonschema:io:revisium:file-schema:1.0.0";
}

/// Map of `$ref` URI to schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefTable {
    refs: HashMap<String, JsonSchema>,
}

impl RefTable {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create table holding the system schemas
    #[must_use]
    pub fn with_system_refs() -> Self {
        let mut table = Self::new();
        let read_only_string = || JsonSchema::from(JsonStringSchema::new().with_read_only(true));

        table.insert(system::ROW_ID, read_only_string());
        table.insert(system::ROW_VERSION_ID, read_only_string());
        table.insert(
            system::ROW_CREATED_AT,
            JsonStringSchema {
                format: Some("date-time".into()),
                ..JsonStringSchema::new().with_read_only(true)
            }
            .into(),
        );
        table.insert(
            system::ROW_UPDATED_AT,
            JsonStringSchema {
                format: Some("date-time".into()),
                ..JsonStringSchema::new().with_read_only(true)
            }
            .into(),
        );
        table.insert(system::FILE, file_schema());
        table
    }

    /// Register a schema under `uri`, returning the previous one
    pub fn insert(&mut self, uri: impl Into<String>, schema: JsonSchema) -> Option<JsonSchema> {
        self.refs.insert(uri.into(), schema)
    }

    /// Look up a schema
    #[inline]
    #[must_use]
    pub fn get(&self, uri: &str) -> Option<&JsonSchema> {
        self.refs.get(uri)
    }

    /// Check if `uri` is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, uri: &str) -> bool {
        self.refs.contains_key(uri)
    }

    /// Merge another table; entries of `other` win
    pub fn extend(&mut self, other: RefTable) {
        self.refs.extend(other.refs);
    }

    /// Number of registered schemas
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// Check if table is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

fn file_schema() -> JsonSchema {
    let read_only_string = || JsonStringSchema::new().with_read_only(true);
    let read_only_number = || JsonNumberSchema::new().with_read_only(true);

    let mut object = JsonObjectSchema::new()
        .with_property("status", read_only_string())
        .with_property("fileId", read_only_string())
        .with_property("url", read_only_string())
        .with_property("fileName", JsonStringSchema::new())
        .with_property("hash", read_only_string())
        .with_property("extension", read_only_string())
        .with_property("mimeType", read_only_string())
        .with_property("size", read_only_number())
        .with_property("width", read_only_number())
        .with_property("height", read_only_number());
    object.meta = SchemaMeta {
        title: Some("File".into()),
        ..SchemaMeta::default()
    };
    object.into()
}
