//! Schema value model
//!
//! A [`SchemaNode`] is one position of a table schema with every `$ref`
//! already resolved. Nodes are built bottom-up by the factory and then
//! shared behind [`Arc`], so one schema can back any number of open row
//! editors without being copied or mutated.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{SchemaError, SchemaResult};
use crate::json_schema::{
    JsonArraySchema, JsonBooleanSchema, JsonNumberSchema, JsonObjectSchema, JsonRefSchema,
    JsonSchema, JsonStringSchema, SchemaMeta, SchemaType,
};

/// Options for [`SchemaNode::get_plain_schema`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlainSchemaOptions {
    /// Emit resolved schemas instead of `{"$ref": ...}` for ref-backed nodes
    pub skip_ref: bool,
}

/// Object schema node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchemaNode {
    properties: IndexMap<String, Arc<SchemaNode>>,
    required: Vec<String>,
    meta: SchemaMeta,
}

impl ObjectSchemaNode {
    /// Create object node without properties
    #[inline]
    #[must_use]
    pub fn new(meta: SchemaMeta) -> Self {
        Self {
            properties: IndexMap::new(),
            required: Vec::new(),
            meta,
        }
    }

    /// Attach a property built by the factory
    ///
    /// # Errors
    /// Returns [`SchemaError::DuplicateProperty`] if `name` is already a
    /// property or already listed as required.
    pub fn add_property_with_store(
        &mut self,
        name: impl Into<String>,
        store: Arc<SchemaNode>,
    ) -> SchemaResult<()> {
        let name = name.into();
        if self.properties.contains_key(&name) || self.required.contains(&name) {
            return Err(SchemaError::DuplicateProperty(name));
        }
        self.required.push(name.clone());
        self.properties.insert(name, store);
        Ok(())
    }

    /// Detach a property
    pub fn remove_property(&mut self, name: &str) -> Option<Arc<SchemaNode>> {
        self.required.retain(|required| required != name);
        self.properties.shift_remove(name)
    }

    /// Property by name
    #[inline]
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Arc<SchemaNode>> {
        self.properties.get(name)
    }

    /// Properties in insertion order
    #[inline]
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Arc<SchemaNode>)> {
        self.properties.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Number of properties
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check if the object has no properties
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Required names, sorted ascending
    #[must_use]
    pub fn required(&self) -> Vec<String> {
        let mut required = self.required.clone();
        required.sort();
        required
    }
}

/// Array schema node
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchemaNode {
    items: Arc<SchemaNode>,
    meta: SchemaMeta,
}

impl ArraySchemaNode {
    /// Create array node over `items`
    #[inline]
    #[must_use]
    pub fn new(items: Arc<SchemaNode>, meta: SchemaMeta) -> Self {
        Self { items, meta }
    }

    /// Item schema
    #[inline]
    #[must_use]
    pub fn items(&self) -> &Arc<SchemaNode> {
        &self.items
    }
}

/// Kind-specific part of a schema node
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNodeKind {
    /// String leaf
    String(JsonStringSchema),
    /// Number leaf
    Number(JsonNumberSchema),
    /// Boolean leaf
    Boolean(JsonBooleanSchema),
    /// Object with named properties
    Object(ObjectSchemaNode),
    /// Array with one item schema
    Array(ArraySchemaNode),
}

/// One resolved position in a table schema
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    node_id: Uuid,
    reference: Option<JsonRefSchema>,
    kind: SchemaNodeKind,
}

impl SchemaNode {
    /// Create node with a fresh `node_id`
    #[inline]
    #[must_use]
    pub fn new(kind: SchemaNodeKind) -> Self {
        Self {
            node_id: Uuid::new_v4(),
            reference: None,
            kind,
        }
    }

    /// Mark node as resolved from the `$ref` site `site`
    ///
    /// Site annotations are layered over the node's own.
    #[must_use]
    pub fn with_reference(mut self, site: JsonRefSchema) -> Self {
        let meta = self.meta().overlay(&site.meta);
        *self.meta_mut() = meta;
        self.reference = Some(site);
        self
    }

    /// Stable identity of this node
    #[inline]
    #[must_use]
    pub fn node_id(&self) -> Uuid {
        self.node_id
    }

    /// `$ref` this node was resolved from
    #[inline]
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_ref().map(|site| site.reference.as_str())
    }

    /// Kind-specific payload
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &SchemaNodeKind {
        &self.kind
    }

    /// Kind tag
    #[inline]
    #[must_use]
    pub fn schema_type(&self) -> SchemaType {
        match &self.kind {
            SchemaNodeKind::String(_) => SchemaType::String,
            SchemaNodeKind::Number(_) => SchemaType::Number,
            SchemaNodeKind::Boolean(_) => SchemaType::Boolean,
            SchemaNodeKind::Object(_) => SchemaType::Object,
            SchemaNodeKind::Array(_) => SchemaType::Array,
        }
    }

    /// Check if the node is a string, number or boolean
    #[inline]
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.schema_type().is_primitive()
    }

    /// Shared annotations
    #[inline]
    #[must_use]
    pub fn meta(&self) -> &SchemaMeta {
        match &self.kind {
            SchemaNodeKind::String(s) => &s.meta,
            SchemaNodeKind::Number(s) => &s.meta,
            SchemaNodeKind::Boolean(s) => &s.meta,
            SchemaNodeKind::Object(s) => &s.meta,
            SchemaNodeKind::Array(s) => &s.meta,
        }
    }

    fn meta_mut(&mut self) -> &mut SchemaMeta {
        match &mut self.kind {
            SchemaNodeKind::String(s) => &mut s.meta,
            SchemaNodeKind::Number(s) => &mut s.meta,
            SchemaNodeKind::Boolean(s) => &mut s.meta,
            SchemaNodeKind::Object(s) => &mut s.meta,
            SchemaNodeKind::Array(s) => &mut s.meta,
        }
    }

    /// Check the deprecated flag
    #[inline]
    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        self.meta().is_deprecated()
    }

    /// Check the read-only flag of a leaf
    #[inline]
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        let flag = match &self.kind {
            SchemaNodeKind::String(s) => s.read_only,
            SchemaNodeKind::Number(s) => s.read_only,
            SchemaNodeKind::Boolean(s) => s.read_only,
            SchemaNodeKind::Object(_) | SchemaNodeKind::Array(_) => None,
        };
        flag.unwrap_or(false)
    }

    /// Foreign key table of a string leaf
    #[inline]
    #[must_use]
    pub fn foreign_key(&self) -> Option<&str> {
        match &self.kind {
            SchemaNodeKind::String(s) => s.effective_foreign_key(),
            _ => None,
        }
    }

    /// Object payload
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectSchemaNode> {
        match &self.kind {
            SchemaNodeKind::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Array payload
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&ArraySchemaNode> {
        match &self.kind {
            SchemaNodeKind::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Value a fresh row holds at this position
    ///
    /// Objects default every property, arrays start empty.
    #[must_use]
    pub fn default_value(&self) -> Value {
        match &self.kind {
            SchemaNodeKind::String(s) => Value::String(s.default.clone()),
            SchemaNodeKind::Number(s) => Value::Number(s.default.clone()),
            SchemaNodeKind::Boolean(s) => Value::Bool(s.default),
            SchemaNodeKind::Object(object) => Value::Object(
                object
                    .properties()
                    .map(|(name, node)| (name.to_string(), node.default_value()))
                    .collect::<Map<_, _>>(),
            ),
            SchemaNodeKind::Array(_) => Value::Array(Vec::new()),
        }
    }

    /// Serialize back to wire format
    ///
    /// `required` is emitted sorted; ref-backed nodes are emitted as
    /// `{"$ref": ...}` unless `options.skip_ref` is set.
    #[must_use]
    pub fn get_plain_schema(&self, options: PlainSchemaOptions) -> JsonSchema {
        if let (Some(site), false) = (&self.reference, options.skip_ref) {
            return JsonSchema::Ref(site.clone());
        }

        match &self.kind {
            SchemaNodeKind::String(s) => JsonSchema::String(s.clone()),
            SchemaNodeKind::Number(s) => JsonSchema::Number(s.clone()),
            SchemaNodeKind::Boolean(s) => JsonSchema::Boolean(s.clone()),
            SchemaNodeKind::Object(object) => JsonSchema::Object(JsonObjectSchema {
                properties: object
                    .properties()
                    .map(|(name, node)| (name.to_string(), node.get_plain_schema(options)))
                    .collect(),
                additional_properties: false,
                required: object.required(),
                meta: object.meta.clone(),
            }),
            SchemaNodeKind::Array(array) => JsonSchema::Array(JsonArraySchema {
                items: Box::new(array.items.get_plain_schema(options)),
                meta: array.meta.clone(),
            }),
        }
    }
}

impl From<SchemaNodeKind> for SchemaNode {
    fn from(kind: SchemaNodeKind) -> Self {
        Self::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn string_node() -> Arc<SchemaNode> {
        Arc::new(SchemaNode::new(SchemaNodeKind::String(
            JsonStringSchema::new().with_default("x"),
        )))
    }

    #[test]
    fn object_add_property() {
        let mut object = ObjectSchemaNode::default();
        object.add_property_with_store("b", string_node()).unwrap();
        object.add_property_with_store("a", string_node()).unwrap();

        assert_eq!(object.len(), 2);
        assert_eq!(object.required(), vec!["a".to_string(), "b".to_string()]);
        let names: Vec<_> = object.properties().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn object_duplicate_property_fails() {
        let mut object = ObjectSchemaNode::default();
        object.add_property_with_store("a", string_node()).unwrap();
        let result = object.add_property_with_store("a", string_node());
        assert!(matches!(result, Err(SchemaError::DuplicateProperty(name)) if name == "a"));
    }

    #[test]
    fn object_remove_property_syncs_required() {
        let mut object = ObjectSchemaNode::default();
        object.add_property_with_store("a", string_node()).unwrap();
        assert!(object.remove_property("a").is_some());
        assert!(object.is_empty());
        assert!(object.required().is_empty());
        // name is free again
        assert!(object.add_property_with_store("a", string_node()).is_ok());
    }

    #[test]
    fn default_value_of_object() {
        let mut object = ObjectSchemaNode::default();
        object.add_property_with_store("name", string_node()).unwrap();
        let list = Arc::new(SchemaNode::new(SchemaNodeKind::Array(ArraySchemaNode::new(
            string_node(),
            SchemaMeta::default(),
        ))));
        object.add_property_with_store("tags", list).unwrap();

        let node = SchemaNode::new(SchemaNodeKind::Object(object));
        assert_eq!(node.default_value(), json!({ "name": "x", "tags": [] }));
    }

    #[test]
    fn plain_schema_of_ref_node() {
        let node = SchemaNode::new(SchemaNodeKind::String(JsonStringSchema::new()))
            .with_reference(JsonRefSchema::new("urn:row-id"));

        assert_eq!(
            node.get_plain_schema(PlainSchemaOptions::default()).to_value(),
            json!({ "$ref": "urn:row-id" })
        );
        assert_eq!(
            node.get_plain_schema(PlainSchemaOptions { skip_ref: true }).to_value(),
            json!({ "type": "string", "default": "" })
        );
    }

    #[test]
    fn node_ids_are_unique() {
        let a = string_node();
        let b = string_node();
        assert_ne!(a.node_id(), b.node_id());
    }

    #[test]
    fn leaf_flags() {
        let node = SchemaNode::new(SchemaNodeKind::String(
            JsonStringSchema::new().with_reference("User").with_read_only(true),
        ));
        assert_eq!(node.foreign_key(), Some("User"));
        assert!(node.is_read_only());
        assert!(node.is_primitive());
        assert!(!node.is_deprecated());
    }
}
