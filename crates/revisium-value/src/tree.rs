//! Value tree arena
//!
//! A row is a tree of value nodes, one per schema position, stored in an
//! arena and addressed by [`ValueId`]. Every node keeps the last persisted
//! value (`base`) next to the edited one (`value`). Parents are plain ids,
//! so nothing but the tree owns a node.

use std::fmt::{self, Display};
use std::sync::Arc;

use indexmap::IndexMap;
use revisium_schema::{SchemaNode, SchemaNodeKind, SchemaType};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::{ValueError, ValueResult};
use crate::store::ValueStore;

/// Handle to a node of a [`ValueTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(usize);

impl ValueId {
    /// Arena slot
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Value tree configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueConfig {
    /// Treat an empty foreign-key string as invalid in its parent
    pub foreign_keys_required: bool,
}

impl ValueConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With or without the foreign-key rule
    #[inline]
    #[must_use]
    pub fn with_foreign_keys_required(mut self, required: bool) -> Self {
        self.foreign_keys_required = required;
        self
    }
}

impl Default for ValueConfig {
    fn default() -> Self {
        Self {
            foreign_keys_required: true,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Primitive<T> {
    pub(crate) base: T,
    pub(crate) value: T,
}

impl<T: Clone> Primitive<T> {
    fn new(base: T) -> Self {
        Self {
            value: base.clone(),
            base,
        }
    }

    fn reset(&mut self, base: T) {
        self.value = base.clone();
        self.base = base;
    }
}

#[derive(Debug, Clone)]
pub(crate) enum ValueKind {
    String(Primitive<String>),
    Number(Primitive<Number>),
    Boolean(Primitive<bool>),
    /// Shape is fixed by the schema, so there is no separate base
    Object(IndexMap<String, ValueId>),
    /// `value` aliases `base` until the first structural edit
    Array {
        base: Arc<Vec<ValueId>>,
        value: Arc<Vec<ValueId>>,
        /// Detached by `remove_item`, released on the next hydrate
        removed: Vec<ValueId>,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct ValueNode {
    pub(crate) parent: Option<ValueId>,
    pub(crate) key: Option<String>,
    pub(crate) schema: Arc<SchemaNode>,
    pub(crate) kind: ValueKind,
}

/// Row value tree bound to a schema
///
/// Removed array items stay in the arena detached from the live tree;
/// their handles remain readable but no longer appear in any path.
/// Hydrating an array releases every item slot below it for reuse, so
/// handles into a rehydrated array must be looked up again.
#[derive(Debug, Clone)]
pub struct ValueTree {
    nodes: Vec<ValueNode>,
    free: Vec<ValueId>,
    root: ValueId,
    config: ValueConfig,
}

impl ValueTree {
    /// Tree holding the schema defaults
    #[must_use]
    pub fn new(schema: Arc<SchemaNode>) -> Self {
        Self::with_config(schema, ValueConfig::default())
    }

    /// Tree holding the schema defaults, with configuration
    #[must_use]
    pub fn with_config(schema: Arc<SchemaNode>, config: ValueConfig) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: ValueId(0),
            config,
        };
        tree.root = tree.alloc(&schema, None, None);
        tree
    }

    /// Tree hydrated from a row snapshot
    #[must_use]
    pub fn from_value(schema: Arc<SchemaNode>, data: &Value) -> Self {
        let mut tree = Self::new(schema);
        tree.assign_base(tree.root, data);
        tree
    }

    /// Root handle
    #[inline]
    #[must_use]
    pub fn root(&self) -> ValueId {
        self.root
    }

    /// Root view
    #[inline]
    #[must_use]
    pub fn root_store(&self) -> ValueStore<'_> {
        ValueStore::new(self, self.root)
    }

    /// View of a node, `None` for foreign handles
    #[inline]
    #[must_use]
    pub fn store(&self, id: ValueId) -> Option<ValueStore<'_>> {
        self.contains(id).then(|| ValueStore::new(self, id))
    }

    /// Does the handle belong to this tree
    #[inline]
    #[must_use]
    pub fn contains(&self, id: ValueId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> ValueConfig {
        self.config
    }

    /// Arena size, detached and released slots included
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false, a tree has a root
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn node(&self, id: ValueId) -> &ValueNode {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: ValueId) -> ValueResult<&mut ValueNode> {
        self.nodes.get_mut(id.0).ok_or(ValueError::UnknownNode(id))
    }

    /// Hydrate a node from a server snapshot
    ///
    /// Sets both base and current value and discards prior edits below
    /// `id`. Objects only assign properties present in `data`; arrays are
    /// rebuilt to `data`'s length. Data that does not fit the schema falls
    /// back to the schema default.
    ///
    /// # Errors
    /// Returns [`ValueError::UnknownNode`] for a foreign handle.
    pub fn update_base_value(&mut self, id: ValueId, data: &Value) -> ValueResult<()> {
        self.node_mut(id)?;
        tracing::debug!("Updating base value of {}", id);
        self.assign_base(id, data);
        Ok(())
    }

    /// Overwrite the current value of a primitive
    ///
    /// # Errors
    /// Returns [`ValueError::KindMismatch`] when `value` does not fit the
    /// node's primitive type, or the node is a composite.
    pub fn set_value(&mut self, id: ValueId, value: Value) -> ValueResult<()> {
        let node = self.node_mut(id)?;
        match (&mut node.kind, value) {
            (ValueKind::String(state), Value::String(value)) => state.value = value,
            (ValueKind::Number(state), Value::Number(value)) => state.value = value,
            (ValueKind::Boolean(state), Value::Bool(value)) => state.value = value,
            (_, other) => {
                return Err(ValueError::KindMismatch {
                    expected: node.schema.schema_type(),
                    found: json_kind(&other).to_string(),
                })
            }
        }
        Ok(())
    }

    /// Overwrite the current value of a string
    ///
    /// # Errors
    /// See [`set_value`](Self::set_value).
    pub fn set_string(&mut self, id: ValueId, value: impl Into<String>) -> ValueResult<()> {
        self.set_value(id, Value::String(value.into()))
    }

    /// Overwrite the current value of a number
    ///
    /// # Errors
    /// See [`set_value`](Self::set_value).
    pub fn set_number(&mut self, id: ValueId, value: impl Into<Number>) -> ValueResult<()> {
        self.set_value(id, Value::Number(value.into()))
    }

    /// Overwrite the current value of a boolean
    ///
    /// # Errors
    /// See [`set_value`](Self::set_value).
    pub fn set_boolean(&mut self, id: ValueId, value: bool) -> ValueResult<()> {
        self.set_value(id, Value::Bool(value))
    }

    /// Append a default item to an array
    ///
    /// # Errors
    /// Returns [`ValueError::KindMismatch`] if `id` is not an array.
    pub fn create_item(&mut self, id: ValueId) -> ValueResult<ValueId> {
        let len = self.array_len(id)?;
        self.insert_item(id, len)
    }

    /// Insert a default item at `index`
    ///
    /// # Errors
    /// Returns [`ValueError::KindMismatch`] if `id` is not an array and
    /// [`ValueError::IndexOutOfBounds`] if `index` is past the end.
    pub fn insert_item(&mut self, id: ValueId, index: usize) -> ValueResult<ValueId> {
        let len = self.array_len(id)?;
        if index > len {
            return Err(ValueError::IndexOutOfBounds { index, len });
        }

        let schema = Arc::clone(&self.node(id).schema);
        let Some(array) = schema.as_array() else {
            return Err(ValueError::KindMismatch {
                expected: SchemaType::Array,
                found: schema.schema_type().to_string(),
            });
        };
        let item = self.alloc(array.items(), Some(id), None);
        self.items_mut(id)?.insert(index, item);
        tracing::debug!("Inserted item {} at {}[{}]", item, id, index);
        Ok(item)
    }

    /// Detach the item at `index`, returning its handle
    ///
    /// # Errors
    /// Returns [`ValueError::KindMismatch`] if `id` is not an array and
    /// [`ValueError::IndexOutOfBounds`] if `index` is past the end.
    pub fn remove_item(&mut self, id: ValueId, index: usize) -> ValueResult<ValueId> {
        let len = self.array_len(id)?;
        if index >= len {
            return Err(ValueError::IndexOutOfBounds { index, len });
        }
        let item = self.items_mut(id)?.remove(index);
        if let ValueKind::Array { removed, .. } = &mut self.node_mut(id)?.kind {
            removed.push(item);
        }
        tracing::debug!("Removed item {} from {}[{}]", item, id, index);
        Ok(item)
    }

    /// Move the item at `from` so it ends up at `to`
    ///
    /// # Errors
    /// Returns [`ValueError::KindMismatch`] if `id` is not an array and
    /// [`ValueError::IndexOutOfBounds`] if either index is past the end.
    pub fn move_item(&mut self, id: ValueId, from: usize, to: usize) -> ValueResult<()> {
        let len = self.array_len(id)?;
        for index in [from, to] {
            if index >= len {
                return Err(ValueError::IndexOutOfBounds { index, len });
            }
        }
        if from != to {
            let items = self.items_mut(id)?;
            let item = items.remove(from);
            items.insert(to, item);
        }
        Ok(())
    }

    fn array_len(&self, id: ValueId) -> ValueResult<usize> {
        let node = self.nodes.get(id.0).ok_or(ValueError::UnknownNode(id))?;
        match &node.kind {
            ValueKind::Array { value, .. } => Ok(value.len()),
            _ => Err(ValueError::KindMismatch {
                expected: SchemaType::Array,
                found: node.schema.schema_type().to_string(),
            }),
        }
    }

    /// Current items, cloned away from the base on first write
    fn items_mut(&mut self, id: ValueId) -> ValueResult<&mut Vec<ValueId>> {
        let node = self.node_mut(id)?;
        match &mut node.kind {
            ValueKind::Array { value, .. } => Ok(Arc::make_mut(value)),
            _ => Err(ValueError::KindMismatch {
                expected: SchemaType::Array,
                found: node.schema.schema_type().to_string(),
            }),
        }
    }

    fn alloc(
        &mut self,
        schema: &Arc<SchemaNode>,
        parent: Option<ValueId>,
        key: Option<String>,
    ) -> ValueId {
        let kind = match schema.kind() {
            SchemaNodeKind::String(s) => ValueKind::String(Primitive::new(s.default.clone())),
            SchemaNodeKind::Number(s) => ValueKind::Number(Primitive::new(s.default.clone())),
            SchemaNodeKind::Boolean(s) => ValueKind::Boolean(Primitive::new(s.default)),
            SchemaNodeKind::Object(_) => ValueKind::Object(IndexMap::new()),
            SchemaNodeKind::Array(_) => {
                let empty = Arc::new(Vec::new());
                ValueKind::Array {
                    base: Arc::clone(&empty),
                    value: empty,
                    removed: Vec::new(),
                }
            }
        };
        let node = ValueNode {
            parent,
            key,
            schema: Arc::clone(schema),
            kind,
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = node;
                id
            }
            None => {
                self.nodes.push(node);
                ValueId(self.nodes.len() - 1)
            }
        };

        if let SchemaNodeKind::Object(object) = schema.kind() {
            let children = object
                .properties()
                .map(|(name, child)| {
                    let child = self.alloc(child, Some(id), Some(name.to_string()));
                    (name.to_string(), child)
                })
                .collect();
            self.nodes[id.0].kind = ValueKind::Object(children);
        }
        id
    }

    fn assign_base(&mut self, id: ValueId, data: &Value) {
        let accepted = match (&mut self.nodes[id.0].kind, data) {
            (ValueKind::String(state), Value::String(s)) => {
                state.reset(s.clone());
                true
            }
            (ValueKind::Number(state), Value::Number(n)) => {
                state.reset(n.clone());
                true
            }
            (ValueKind::Boolean(state), Value::Bool(b)) => {
                state.reset(*b);
                true
            }
            (ValueKind::Object(children), Value::Object(map)) => {
                let present: Vec<(ValueId, &Value)> = children
                    .iter()
                    .filter_map(|(name, child)| map.get(name).map(|value| (*child, value)))
                    .collect();
                for (child, value) in present {
                    self.assign_base(child, value);
                }
                true
            }
            // Object shape is fixed by the schema
            (ValueKind::Object(_), Value::Null) => true,
            (ValueKind::Array { .. }, Value::Array(items)) => {
                self.rebuild_items(id, items);
                true
            }
            _ => false,
        };

        if !accepted {
            let node = &self.nodes[id.0];
            if !data.is_null() {
                tracing::warn!(
                    "Value at {} is {}, expected {}; using default",
                    id,
                    json_kind(data),
                    node.schema.schema_type()
                );
            }
            self.reset_to_default(id);
        }
    }

    fn rebuild_items(&mut self, id: ValueId, data: &[Value]) {
        let schema = Arc::clone(&self.nodes[id.0].schema);
        let Some(array) = schema.as_array() else {
            return;
        };

        self.release_items(id);
        let items: Vec<ValueId> = data
            .iter()
            .map(|value| {
                let item = self.alloc(array.items(), Some(id), None);
                self.assign_base(item, value);
                item
            })
            .collect();

        if let ValueKind::Array { base, value, .. } = &mut self.nodes[id.0].kind {
            let items = Arc::new(items);
            *base = Arc::clone(&items);
            *value = items;
        }
    }

    fn reset_to_default(&mut self, id: ValueId) {
        if matches!(self.nodes[id.0].kind, ValueKind::Array { .. }) {
            self.release_items(id);
            return;
        }
        let schema = Arc::clone(&self.nodes[id.0].schema);
        match (&mut self.nodes[id.0].kind, schema.kind()) {
            (ValueKind::String(state), SchemaNodeKind::String(s)) => state.reset(s.default.clone()),
            (ValueKind::Number(state), SchemaNodeKind::Number(s)) => state.reset(s.default.clone()),
            (ValueKind::Boolean(state), SchemaNodeKind::Boolean(s)) => state.reset(s.default),
            // Objects keep their children; nothing was assigned
            _ => {}
        }
    }

    /// Empty an array and return every slot below it to the free list
    fn release_items(&mut self, id: ValueId) {
        let ValueKind::Array {
            base,
            value,
            removed,
        } = &mut self.nodes[id.0].kind
        else {
            return;
        };
        let mut items: Vec<ValueId> = base
            .iter()
            .chain(value.iter())
            .chain(removed.iter())
            .copied()
            .collect();
        let empty = Arc::new(Vec::new());
        *base = Arc::clone(&empty);
        *value = empty;
        removed.clear();

        items.sort_unstable();
        items.dedup();
        for item in items {
            self.release(item);
        }
    }

    fn release(&mut self, id: ValueId) {
        if let ValueKind::Object(children) = &self.nodes[id.0].kind {
            let children: Vec<ValueId> = children.values().copied().collect();
            for child in children {
                self.release(child);
            }
        } else {
            self.release_items(id);
        }
        self.free.push(id);
    }
}

/// Empty value tree for a schema (`createEmptyJsonValueStore`)
#[must_use]
pub fn create_empty_json_value_store(schema: Arc<SchemaNode>) -> ValueTree {
    ValueTree::new(schema)
}

/// Value tree hydrated from row data (`createJsonValueStore`)
#[must_use]
pub fn create_json_value_store(schema: Arc<SchemaNode>, data: &Value) -> ValueTree {
    ValueTree::from_value(schema, data)
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
