//! Testing utilities for the Revisium workspace
//!
//! Shared schema fixtures and builders.

#![allow(missing_docs)]

use std::sync::Arc;

use revisium_schema::{
    create_schema_store, JsonArraySchema, JsonBooleanSchema, JsonNumberSchema, JsonObjectSchema,
    JsonSchema, JsonStringSchema, RefTable, SchemaNode,
};
use serde_json::{json, Value};

pub fn string_schema() -> JsonSchema {
    JsonStringSchema::new().into()
}

pub fn number_schema() -> JsonSchema {
    JsonNumberSchema::new().into()
}

pub fn boolean_schema() -> JsonSchema {
    JsonBooleanSchema::new().into()
}

pub fn foreign_key_schema(table: &str) -> JsonSchema {
    JsonStringSchema::new().with_foreign_key(table).into()
}

pub fn object_schema<I, K>(properties: I) -> JsonSchema
where
    I: IntoIterator<Item = (K, JsonSchema)>,
    K: Into<String>,
{
    let mut object = JsonObjectSchema::new();
    for (name, schema) in properties {
        object = object.with_property(name, schema);
    }
    object.required.sort();
    object.into()
}

pub fn array_schema(items: JsonSchema) -> JsonSchema {
    JsonArraySchema::new(items).into()
}

/// `{ title, views, published, author(fk User), tags: [string], comments: [{ text, by }] }`
pub fn post_schema() -> JsonSchema {
    object_schema([
        ("title", string_schema()),
        ("views", number_schema()),
        ("published", boolean_schema()),
        ("author", foreign_key_schema("User")),
        ("tags", array_schema(string_schema())),
        (
            "comments",
            array_schema(object_schema([
                ("text", string_schema()),
                ("by", foreign_key_schema("User")),
            ])),
        ),
    ])
}

pub fn post_row() -> Value {
    json!({
        "title": "Hello",
        "views": 10,
        "published": true,
        "author": "alice",
        "tags": ["rust", "json"],
        "comments": [
            { "text": "first", "by": "bob" },
            { "text": "second", "by": "carol" }
        ]
    })
}

pub fn build(schema: &JsonSchema) -> Arc<SchemaNode> {
    create_schema_store(schema, &RefTable::new()).unwrap()
}

pub fn build_post() -> Arc<SchemaNode> {
    build(&post_schema())
}
