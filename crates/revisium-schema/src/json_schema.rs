//! Wire-format JSON Schema
//!
//! Provides [`JsonSchema`], the tagged union the table-schema query delivers
//! and the table-create mutation accepts back.
//!
//! Object schemas are closed: `additionalProperties` is always `false` and
//! `required` always lists every property, sorted ascending on output.

use std::fmt::{self, Display, Formatter};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

use crate::error::{SchemaError, SchemaResult};
use crate::pointer::{ITEMS, PROPERTIES};

/// The five schema kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// `"string"`
    String,
    /// `"number"`
    Number,
    /// `"boolean"`
    Boolean,
    /// `"object"`
    Object,
    /// `"array"`
    Array,
}

impl SchemaType {
    /// Wire name of the kind
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    /// Check if the kind holds a scalar value
    #[inline]
    #[must_use]
    pub fn is_primitive(self) -> bool {
        matches!(self, Self::String | Self::Number | Self::Boolean)
    }
}

impl Display for SchemaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Annotations shared by every schema shape
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMeta {
    /// Human readable title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Field kept for compatibility but hidden from new rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
}

impl SchemaMeta {
    /// Check the deprecated flag
    #[inline]
    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        self.deprecated.unwrap_or(false)
    }

    /// Check if no annotation is set
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.deprecated.is_none()
    }

    /// Layer `site` over `self`: annotations present on `site` win
    #[must_use]
    pub fn overlay(&self, site: &Self) -> Self {
        Self {
            title: site.title.clone().or_else(|| self.title.clone()),
            description: site.description.clone().or_else(|| self.description.clone()),
            deprecated: site.deprecated.or(self.deprecated),
        }
    }
}

/// `{"type": "string"}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonStringSchema {
    /// Default value for new rows
    #[serde(default)]
    pub default: String,

    /// Table whose row id this value must hold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,

    /// Legacy spelling of `foreignKey`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Value is maintained by the system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    /// Media type of the content (`text/markdown`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_media_type: Option<String>,

    /// ECMA-262 pattern
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Format hint (`date-time`, `email`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Allowed values
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<Vec<String>>,

    /// Shared annotations
    #[serde(flatten)]
    pub meta: SchemaMeta,
}

impl JsonStringSchema {
    /// Empty string schema
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With default value
    #[inline]
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = default.into();
        self
    }

    /// With foreign key table
    #[inline]
    #[must_use]
    pub fn with_foreign_key(mut self, table: impl Into<String>) -> Self {
        self.foreign_key = Some(table.into());
        self
    }

    /// With legacy reference table
    #[inline]
    #[must_use]
    pub fn with_reference(mut self, table: impl Into<String>) -> Self {
        self.reference = Some(table.into());
        self
    }

    /// With read-only flag
    #[inline]
    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = Some(read_only);
        self
    }

    /// Effective foreign key: `foreignKey`, else `reference`
    #[inline]
    #[must_use]
    pub fn effective_foreign_key(&self) -> Option<&str> {
        self.foreign_key.as_deref().or(self.reference.as_deref())
    }
}

/// `{"type": "number"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonNumberSchema {
    /// Default value for new rows
    #[serde(default = "zero")]
    pub default: Number,

    /// Value is maintained by the system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    /// Shared annotations
    #[serde(flatten)]
    pub meta: SchemaMeta,
}

fn zero() -> Number {
    Number::from(0)
}

impl Default for JsonNumberSchema {
    fn default() -> Self {
        Self {
            default: zero(),
            read_only: None,
            meta: SchemaMeta::default(),
        }
    }
}

impl JsonNumberSchema {
    /// Number schema defaulting to `0`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With default value
    #[inline]
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Number>) -> Self {
        self.default = default.into();
        self
    }

    /// With read-only flag
    #[inline]
    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = Some(read_only);
        self
    }
}

/// `{"type": "boolean"}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonBooleanSchema {
    /// Default value for new rows
    #[serde(default)]
    pub default: bool,

    /// Value is maintained by the system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    /// Shared annotations
    #[serde(flatten)]
    pub meta: SchemaMeta,
}

impl JsonBooleanSchema {
    /// Boolean schema defaulting to `false`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With default value
    #[inline]
    #[must_use]
    pub fn with_default(mut self, default: bool) -> Self {
        self.default = default;
        self
    }
}

/// `{"type": "object"}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonObjectSchema {
    /// Property schemas by name
    #[serde(default)]
    pub properties: IndexMap<String, JsonSchema>,

    /// Always `false`
    #[serde(default)]
    pub additional_properties: bool,

    /// Every property name
    #[serde(default)]
    pub required: Vec<String>,

    /// Shared annotations
    #[serde(flatten)]
    pub meta: SchemaMeta,
}

impl JsonObjectSchema {
    /// Object schema without properties
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a property, also listed in `required`
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, schema: impl Into<JsonSchema>) -> Self {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name.clone());
        }
        self.properties.insert(name, schema.into());
        self
    }
}

/// `{"type": "array"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonArraySchema {
    /// Schema of every item
    pub items: Box<JsonSchema>,

    /// Shared annotations
    #[serde(flatten)]
    pub meta: SchemaMeta,
}

impl JsonArraySchema {
    /// Array of `items`
    #[inline]
    #[must_use]
    pub fn new(items: impl Into<JsonSchema>) -> Self {
        Self {
            items: Box::new(items.into()),
            meta: SchemaMeta::default(),
        }
    }
}

/// `{"$ref": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRefSchema {
    /// Ref table key
    #[serde(rename = "$ref")]
    pub reference: String,

    /// Site annotations, layered over the resolved schema
    #[serde(flatten)]
    pub meta: SchemaMeta,
}

impl JsonRefSchema {
    /// Ref to `uri`
    #[inline]
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            reference: uri.into(),
            meta: SchemaMeta::default(),
        }
    }
}

/// Wire JSON Schema
#[derive(Debug, Clone, PartialEq)]
pub enum JsonSchema {
    /// String field
    String(JsonStringSchema),
    /// Number field
    Number(JsonNumberSchema),
    /// Boolean field
    Boolean(JsonBooleanSchema),
    /// Closed object
    Object(JsonObjectSchema),
    /// Homogeneous array
    Array(JsonArraySchema),
    /// Indirection into the ref table
    Ref(JsonRefSchema),
}

impl JsonSchema {
    /// Parse from a JSON value
    ///
    /// # Errors
    /// Returns [`SchemaError::UnsupportedType`] when `type` is missing or
    /// unknown at any depth, [`SchemaError::InvalidSchema`] when fields are
    /// malformed.
    pub fn from_value(mut value: Value) -> SchemaResult<Self> {
        if value.get("$ref").is_some() {
            return Ok(Self::Ref(serde_json::from_value(value)?));
        }

        let kind = value.get("type").and_then(Value::as_str).map(str::to_owned);
        match kind.as_deref() {
            Some("string") => Ok(Self::String(serde_json::from_value(value)?)),
            Some("number") => Ok(Self::Number(serde_json::from_value(value)?)),
            Some("boolean") => Ok(Self::Boolean(serde_json::from_value(value)?)),
            Some("object") => {
                let properties = value.as_object_mut().and_then(|map| map.remove(PROPERTIES));
                let mut object: JsonObjectSchema = serde_json::from_value(value)?;
                if let Some(properties) = properties {
                    let Value::Object(properties) = properties else {
                        return Err(SchemaError::InvalidSchema(serde::de::Error::custom(
                            "properties must be an object",
                        )));
                    };
                    object.properties = properties
                        .into_iter()
                        .map(|(name, child)| Self::from_value(child).map(|child| (name, child)))
                        .collect::<SchemaResult<_>>()?;
                }
                Ok(Self::Object(object))
            }
            Some("array") => match value.as_object_mut().and_then(|map| map.remove(ITEMS)) {
                Some(items) => Ok(Self::Array(JsonArraySchema {
                    items: Box::new(Self::from_value(items)?),
                    meta: serde_json::from_value(value)?,
                })),
                // Reports the missing field
                None => Ok(Self::Array(serde_json::from_value(value)?)),
            },
            Some(other) => Err(SchemaError::UnsupportedType(other.to_string())),
            None => Err(SchemaError::UnsupportedType("<missing>".to_string())),
        }
    }

    /// Parse from a JSON string
    ///
    /// # Errors
    /// Same as [`JsonSchema::from_value`], plus syntax errors.
    pub fn from_json(json: &str) -> SchemaResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Serialize to a JSON value
    #[must_use]
    pub fn to_value(&self) -> Value {
        // Only string keys and finite numbers reach the serializer.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Kind of the schema, `None` for an unresolved `$ref`
    #[inline]
    #[must_use]
    pub fn schema_type(&self) -> Option<SchemaType> {
        match self {
            Self::String(_) => Some(SchemaType::String),
            Self::Number(_) => Some(SchemaType::Number),
            Self::Boolean(_) => Some(SchemaType::Boolean),
            Self::Object(_) => Some(SchemaType::Object),
            Self::Array(_) => Some(SchemaType::Array),
            Self::Ref(_) => None,
        }
    }

    /// Shared annotations
    #[inline]
    #[must_use]
    pub fn meta(&self) -> &SchemaMeta {
        match self {
            Self::String(s) => &s.meta,
            Self::Number(s) => &s.meta,
            Self::Boolean(s) => &s.meta,
            Self::Object(s) => &s.meta,
            Self::Array(s) => &s.meta,
            Self::Ref(s) => &s.meta,
        }
    }

    /// Mutable shared annotations
    #[inline]
    pub fn meta_mut(&mut self) -> &mut SchemaMeta {
        match self {
            Self::String(s) => &mut s.meta,
            Self::Number(s) => &mut s.meta,
            Self::Boolean(s) => &mut s.meta,
            Self::Object(s) => &mut s.meta,
            Self::Array(s) => &mut s.meta,
            Self::Ref(s) => &mut s.meta,
        }
    }
}

impl From<JsonStringSchema> for JsonSchema {
    fn from(schema: JsonStringSchema) -> Self {
        Self::String(schema)
    }
}

impl From<JsonNumberSchema> for JsonSchema {
    fn from(schema: JsonNumberSchema) -> Self {
        Self::Number(schema)
    }
}

impl From<JsonBooleanSchema> for JsonSchema {
    fn from(schema: JsonBooleanSchema) -> Self {
        Self::Boolean(schema)
    }
}

impl From<JsonObjectSchema> for JsonSchema {
    fn from(schema: JsonObjectSchema) -> Self {
        Self::Object(schema)
    }
}

impl From<JsonArraySchema> for JsonSchema {
    fn from(schema: JsonArraySchema) -> Self {
        Self::Array(schema)
    }
}

impl From<JsonRefSchema> for JsonSchema {
    fn from(schema: JsonRefSchema) -> Self {
        Self::Ref(schema)
    }
}

/// Borrowed view used to write the `type` tag
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Tagged<'a> {
    String(&'a JsonStringSchema),
    Number(&'a JsonNumberSchema),
    Boolean(&'a JsonBooleanSchema),
    Object(&'a JsonObjectSchema),
    Array(&'a JsonArraySchema),
}

impl Serialize for JsonSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::String(s) => Tagged::String(s).serialize(serializer),
            Self::Number(s) => Tagged::Number(s).serialize(serializer),
            Self::Boolean(s) => Tagged::Boolean(s).serialize(serializer),
            Self::Object(s) => Tagged::Object(s).serialize(serializer),
            Self::Array(s) => Tagged::Array(s).serialize(serializer),
            Self::Ref(s) => s.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for JsonSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}
