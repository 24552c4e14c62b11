//! Revisium Schema
//!
//! JSON Schema model for revisioned tables.
//!
//! # Core Concepts
//!
//! - [`JsonSchema`]: Wire format delivered by and sent to the backend
//! - [`SchemaNode`]: Resolved, shareable schema tree
//! - [`SchemaStoreFactory`]: Builds schema trees, resolving `$ref` via [`RefTable`]
//! - [`JsonPointer`]: RFC 6901 addressing inside schemas and rows
//! - [`JsonPatch`]: Schema edits sent to the schema-update mutation
//!
//! # Example
//!
//! ```rust
//! use revisium_schema::{create_schema_store, JsonSchema, PlainSchemaOptions, RefTable};
//! use serde_json::json;
//!
//! let schema = JsonSchema::from_value(json!({
//!     "type": "object",
//!     "additionalProperties": false,
//!     "required": ["name"],
//!     "properties": { "name": { "type": "string", "default": "" } }
//! }))?;
//!
//! let node = create_schema_store(&schema, &RefTable::new())?;
//! assert_eq!(node.get_plain_schema(PlainSchemaOptions::default()), schema);
//! # Ok::<(), revisium_schema::SchemaError>(())
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod error;
mod factory;
mod json_schema;
mod node;
mod patch;
mod pointer;
mod refs;
mod traverse;

// Re-exports
pub use error::{SchemaError, SchemaResult};
pub use factory::{create_schema_store, FactoryConfig, SchemaStoreFactory};
pub use json_schema::{
    JsonArraySchema, JsonBooleanSchema, JsonNumberSchema, JsonObjectSchema, JsonRefSchema,
    JsonSchema, JsonStringSchema, SchemaMeta, SchemaType,
};
pub use node::{ArraySchemaNode, ObjectSchemaNode, PlainSchemaOptions, SchemaNode, SchemaNodeKind};
pub use patch::{JsonPatch, PatchOp};
pub use pointer::{escape_segment, JsonPointer, PointerError, ITEMS, PROPERTIES};
pub use refs::{system, RefTable};
pub use traverse::{collect_foreign_keys, traverse_schema, traverse_with_skip, Traversal};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
