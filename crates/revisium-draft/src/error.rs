//! Error types for the schema editor

use revisium_schema::SchemaError;

use crate::store::NodeKey;

/// Result alias for editor operations
pub type DraftResult<T> = Result<T, DraftError>;

/// Schema editor errors
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    /// Key does not belong to this editor
    #[error("unknown node: {0}")]
    UnknownNode(NodeKey),

    /// Operation needs an object node
    #[error("node {0} is not an object")]
    NotAnObject(NodeKey),

    /// Operation needs an array node
    #[error("node {0} is not an array")]
    NotAnArray(NodeKey),

    /// Node is not a draft property of the object
    #[error("node {child} is not a property of {parent}")]
    NotAChild {
        /// Object node
        parent: NodeKey,
        /// Expected property
        child: NodeKey,
    },

    /// Relative insert position names a node that is not a sibling
    #[error("anchor {0} not found among properties")]
    AnchorNotFound(NodeKey),

    /// Node would end up inside itself
    #[error("node {0} cannot be nested inside itself")]
    Nested(NodeKey),

    /// Array item nodes only change through `set_items`
    #[error("node {0} is the item node of an array")]
    ArrayItems(NodeKey),

    /// Schema rule violated, e.g. duplicate property name
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
