//! Revisium Draft
//!
//! Schema editor with committed and draft state per node.
//!
//! # Core Concepts
//!
//! - [`Draft`]: A committed value and its pending edit
//! - [`NodeStore`]: Protocol shared by every editor node (id, parent, submit, reset)
//! - [`RootNodeStore`]: Editing session owning all nodes of one schema
//! - [`RootNodeStore::get_patches`]: JSON Patch list from committed to draft schema
//!
//! # Example
//!
//! ```rust
//! use revisium_draft::{NodeStore, Position, RootNodeStore, StringNodeStore};
//! use revisium_schema::{JsonSchema, JsonStringSchema};
//! use serde_json::json;
//!
//! let schema = JsonSchema::from_value(json!({
//!     "type": "object",
//!     "additionalProperties": false,
//!     "required": ["name"],
//!     "properties": { "name": { "type": "string", "default": "" } }
//! }))?;
//! let mut store = RootNodeStore::from_schema(&schema);
//!
//! let mut slug = StringNodeStore::from_schema(&JsonStringSchema::new());
//! slug.set_id("slug");
//! let slug = store.insert(slug);
//! store.add_property(store.root(), slug, Position::Append)?;
//!
//! let patches = store.get_patches();
//! assert_eq!(patches.len(), 1);
//! assert_eq!(patches[0].path().to_string(), "/properties/slug");
//!
//! store.submit_changes();
//! assert!(store.get_patches().is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod draft;
mod error;
mod leaf;
mod node;
mod patches;
mod root;
mod stage;
mod store;

// Re-exports
pub use draft::{Draft, View};
pub use error::{DraftError, DraftResult};
pub use leaf::{
    BooleanNodeStore, NumberNodeStore, RefNodeStore, StringForeignKeyNodeStore, StringNodeStore,
};
pub use node::{ArrayNodeStore, DraftNode, ObjectNodeStore};
pub use root::{create_schema_node, Position, RootNodeStore};
pub use store::{NodeKey, NodeState, NodeStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
