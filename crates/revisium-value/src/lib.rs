//! Revisium Value
//!
//! Row values bound to a schema tree, with edit tracking.
//!
//! # Core Concepts
//!
//! - [`ValueTree`]: Arena of value nodes hydrated from row JSON
//! - [`ValueStore`]: Borrowed view answering `touched`, `is_valid` and path queries
//! - [`ValueRegistry`]: Values of several open rows indexed by schema node
//!
//! # Example
//!
//! ```rust
//! use revisium_schema::{create_schema_store, JsonSchema, RefTable};
//! use revisium_value::ValueTree;
//! use serde_json::json;
//!
//! let schema = JsonSchema::from_value(json!({
//!     "type": "object",
//!     "additionalProperties": false,
//!     "required": ["tags"],
//!     "properties": {
//!         "tags": { "type": "array", "items": { "type": "string", "default": "" } }
//!     }
//! }))?;
//! let node = create_schema_store(&schema, &RefTable::new())?;
//!
//! let mut tree = ValueTree::from_value(node, &json!({ "tags": ["a"] }));
//! let tags = tree.root_store().child("tags").map(|tags| tags.handle()).unwrap();
//! let item = tree.create_item(tags)?;
//! tree.set_string(item, "b")?;
//!
//! assert!(tree.root_store().touched());
//! assert_eq!(tree.store(item).unwrap().compute_value_path(), "tags[1]");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod error;
mod path;
mod registry;
mod sort;
mod store;
mod traverse;
mod tree;
mod validation;

// Re-exports
pub use error::{ValueError, ValueResult};
pub use path::{compute_value_path, json_pointer};
pub use registry::ValueRegistry;
pub use sort::{priority_sort_comparator, to_sorted_json_value};
pub use store::ValueStore;
pub use traverse::{traverse_value, traverse_value_with_skip};
pub use tree::{
    create_empty_json_value_store, create_json_value_store, ValueConfig, ValueId, ValueTree,
};
pub use validation::{validation_issues, IssueKind, ValidationIssue};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
