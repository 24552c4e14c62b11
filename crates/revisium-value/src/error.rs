//! Error types for value tree operations

use revisium_schema::SchemaType;

use crate::tree::ValueId;

/// Result alias for value tree operations
pub type ValueResult<T> = Result<T, ValueError>;

/// Value tree errors
///
/// These only arise when an operation addresses the wrong node; data that
/// does not match the schema is never an error (see
/// [`ValueTree::update_base_value`](crate::ValueTree::update_base_value)).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// Handle does not belong to this tree
    #[error("unknown value node: {0}")]
    UnknownNode(ValueId),

    /// Operation needs a different kind of node or value
    #[error("expected {expected}, found {found}")]
    KindMismatch {
        /// Kind the operation works on
        expected: SchemaType,
        /// What was supplied
        found: String,
    },

    /// Array index past the end
    #[error("index {index} out of bounds for array of length {len}")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Current length
        len: usize,
    },
}
