//! Per-row value registry
//!
//! Several rows can be open against one schema at a time. The registry
//! indexes every value node of a row under the schema node it is bound
//! to, so the schema tree itself stays immutable and shareable.

use std::collections::HashMap;

use revisium_schema::SchemaNode;
use uuid::Uuid;

use crate::traverse::traverse_value;
use crate::tree::{ValueId, ValueTree};

/// Value nodes by row id and schema node id
#[derive(Debug, Clone, Default)]
pub struct ValueRegistry {
    rows: HashMap<String, HashMap<Uuid, Vec<ValueId>>>,
}

impl ValueRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every live node of `tree` under `row_id`
    ///
    /// Replaces an earlier registration of the same row. Returns the
    /// number of nodes indexed.
    pub fn register_value(&mut self, row_id: impl Into<String>, tree: &ValueTree) -> usize {
        let row_id = row_id.into();
        let mut index: HashMap<Uuid, Vec<ValueId>> = HashMap::new();
        let mut count = 0;
        traverse_value(tree.root_store(), |store| {
            index
                .entry(store.schema().node_id())
                .or_default()
                .push(store.handle());
            count += 1;
        });

        tracing::debug!("Registered row {} with {} values", row_id, count);
        self.rows.insert(row_id, index);
        count
    }

    /// Values bound to `schema` in row `row_id`
    #[must_use]
    pub fn get_value(&self, schema: &SchemaNode, row_id: &str) -> &[ValueId] {
        self.rows
            .get(row_id)
            .and_then(|index| index.get(&schema.node_id()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Drop a row, returning whether it was registered
    pub fn unregister(&mut self, row_id: &str) -> bool {
        self.rows.remove(row_id).is_some()
    }

    /// Is the row registered
    #[inline]
    #[must_use]
    pub fn contains_row(&self, row_id: &str) -> bool {
        self.rows.contains_key(row_id)
    }

    /// Registered row ids
    pub fn rows(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// Number of registered rows
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// No rows registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
