//! Schema store factory
//!
//! Turns a wire [`JsonSchema`] into a shared [`SchemaNode`] tree, resolving
//! every `$ref` through a [`RefTable`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{SchemaError, SchemaResult};
use crate::json_schema::JsonSchema;
use crate::node::{ArraySchemaNode, ObjectSchemaNode, SchemaNode, SchemaNodeKind};
use crate::refs::RefTable;

/// Factory configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Maximum nesting depth, guards against cyclic ref tables
    pub max_depth: usize,
    /// Seed the ref table with the system schemas
    pub system_refs: bool,
}

impl FactoryConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With maximum nesting depth
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// With or without system refs
    #[inline]
    #[must_use]
    pub fn with_system_refs(mut self, system_refs: bool) -> Self {
        self.system_refs = system_refs;
        self
    }
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            system_refs: true,
        }
    }
}

/// Builds [`SchemaNode`] trees
#[derive(Debug, Clone)]
pub struct SchemaStoreFactory {
    refs: RefTable,
    config: FactoryConfig,
}

impl SchemaStoreFactory {
    /// Create factory from configuration
    #[must_use]
    pub fn new(config: FactoryConfig) -> Self {
        let refs = if config.system_refs {
            RefTable::with_system_refs()
        } else {
            RefTable::new()
        };
        Self { refs, config }
    }

    /// With additional ref definitions
    #[inline]
    #[must_use]
    pub fn with_refs(mut self, refs: RefTable) -> Self {
        self.refs.extend(refs);
        self
    }

    /// Ref table in use
    #[inline]
    #[must_use]
    pub fn refs(&self) -> &RefTable {
        &self.refs
    }

    /// Build the schema tree
    ///
    /// # Errors
    /// Returns error if a `$ref` is undefined, a property name repeats, or
    /// nesting exceeds [`FactoryConfig::max_depth`].
    pub fn build(&self, schema: &JsonSchema) -> SchemaResult<Arc<SchemaNode>> {
        tracing::debug!("Building schema store");
        let node = self.build_at(schema, 0)?;
        tracing::debug!("Schema store built: root {}", node.schema_type());
        Ok(node)
    }

    fn build_at(&self, schema: &JsonSchema, depth: usize) -> SchemaResult<Arc<SchemaNode>> {
        if depth > self.config.max_depth {
            return Err(SchemaError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }

        let node = match schema {
            JsonSchema::Ref(site) => {
                let resolved = self
                    .refs
                    .get(&site.reference)
                    .ok_or_else(|| SchemaError::UndefinedRef(site.reference.clone()))?;
                tracing::debug!("Resolving $ref {}", site.reference);

                let target = self.build_at(resolved, depth + 1)?;
                Arc::try_unwrap(target)
                    .unwrap_or_else(|shared| (*shared).clone())
                    .with_reference(site.clone())
            }
            JsonSchema::Object(object) => {
                let mut store = ObjectSchemaNode::new(object.meta.clone());
                for (name, child) in &object.properties {
                    let child = self.build_at(child, depth + 1)?;
                    store.add_property_with_store(name.clone(), child)?;
                }
                SchemaNode::new(SchemaNodeKind::Object(store))
            }
            JsonSchema::Array(array) => {
                let items = self.build_at(&array.items, depth + 1)?;
                SchemaNode::new(SchemaNodeKind::Array(ArraySchemaNode::new(
                    items,
                    array.meta.clone(),
                )))
            }
            JsonSchema::String(s) => SchemaNode::new(SchemaNodeKind::String(s.clone())),
            JsonSchema::Number(s) => SchemaNode::new(SchemaNodeKind::Number(s.clone())),
            JsonSchema::Boolean(s) => SchemaNode::new(SchemaNodeKind::Boolean(s.clone())),
        };

        Ok(Arc::new(node))
    }
}

impl Default for SchemaStoreFactory {
    fn default() -> Self {
        Self::new(FactoryConfig::default())
    }
}

/// Build a schema tree with the default factory plus `refs`
///
/// # Errors
/// See [`SchemaStoreFactory::build`].
pub fn create_schema_store(schema: &JsonSchema, refs: &RefTable) -> SchemaResult<Arc<SchemaNode>> {
    SchemaStoreFactory::default()
        .with_refs(refs.clone())
        .build(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_schema::{JsonRefSchema, JsonStringSchema, SchemaType};
    use crate::node::PlainSchemaOptions;
    use crate::refs::system;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> JsonSchema {
        JsonSchema::from_value(value).unwrap()
    }

    #[test]
    fn build_object_with_array() {
        let schema = parse(json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["tags", "title"],
            "properties": {
                "title": { "type": "string", "default": "" },
                "tags": { "type": "array", "items": { "type": "string", "default": "" } }
            }
        }));

        let node = create_schema_store(&schema, &RefTable::new()).unwrap();
        let object = node.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(
            object.property("tags").unwrap().schema_type(),
            SchemaType::Array
        );
    }

    #[test]
    fn build_resolves_ref() {
        let mut refs = RefTable::new();
        refs.insert("urn:user", JsonStringSchema::new().with_default("guest").into());
        let schema: JsonSchema = JsonRefSchema::new("urn:user").into();

        let node = SchemaStoreFactory::new(FactoryConfig::new().with_system_refs(false))
            .with_refs(refs)
            .build(&schema)
            .unwrap();

        assert_eq!(node.reference(), Some("urn:user"));
        assert_eq!(node.default_value(), json!("guest"));
    }

    #[test]
    fn build_system_file_ref() {
        let schema = parse(json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["cover"],
            "properties": { "cover": { "$ref": system::FILE, "title": "Cover" } }
        }));

        let node = SchemaStoreFactory::default().build(&schema).unwrap();
        let cover = node.as_object().unwrap().property("cover").unwrap();
        assert_eq!(cover.schema_type(), SchemaType::Object);
        assert_eq!(cover.meta().title.as_deref(), Some("Cover"));

        let plain = node.get_plain_schema(PlainSchemaOptions::default());
        assert_eq!(
            plain.to_value()["properties"]["cover"],
            json!({ "$ref": system::FILE, "title": "Cover" })
        );
    }

    #[test]
    fn undefined_ref_fails() {
        let schema: JsonSchema = JsonRefSchema::new("urn:missing").into();
        let result = create_schema_store(&schema, &RefTable::new());
        assert!(matches!(result, Err(SchemaError::UndefinedRef(uri)) if uri == "urn:missing"));
    }

    #[test]
    fn cyclic_ref_hits_depth_limit() {
        let mut refs = RefTable::new();
        refs.insert(
            "urn:loop",
            parse(json!({ "type": "array", "items": { "$ref": "urn:loop" } })),
        );
        let schema: JsonSchema = JsonRefSchema::new("urn:loop").into();

        let result = SchemaStoreFactory::new(FactoryConfig::new().with_max_depth(8))
            .with_refs(refs)
            .build(&schema);
        assert!(matches!(result, Err(SchemaError::DepthExceeded { limit: 8 })));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: FactoryConfig = serde_json::from_value(json!({ "max_depth": 4 })).unwrap();
        assert_eq!(config.max_depth, 4);
        assert!(config.system_refs);
    }
}
