//! Composite node stores and the node sum type

use revisium_schema::{SchemaMeta, SchemaType};

use crate::draft::{Draft, View};
use crate::leaf::{BooleanNodeStore, NumberNodeStore, RefNodeStore, StringNodeStore};
use crate::store::{NodeKey, NodeState, NodeStore};

/// Object field; property order, membership and annotations are dual-state
#[derive(Debug, Clone, Default)]
pub struct ObjectNodeStore {
    state: Draft<NodeState>,
    properties: Draft<Vec<NodeKey>>,
    meta: Draft<SchemaMeta>,
}

impl ObjectNodeStore {
    /// No properties
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With annotations
    #[inline]
    #[must_use]
    pub fn with_meta(mut self, meta: SchemaMeta) -> Self {
        self.meta = Draft::new(meta);
        self
    }

    /// Committed annotations
    #[inline]
    #[must_use]
    pub fn meta(&self) -> &SchemaMeta {
        self.meta.committed()
    }

    /// Pending annotations
    #[inline]
    #[must_use]
    pub fn draft_meta(&self) -> &SchemaMeta {
        self.meta.draft()
    }

    /// Annotations in either view
    #[inline]
    #[must_use]
    pub fn meta_in(&self, view: View) -> &SchemaMeta {
        self.meta.get(view)
    }

    /// Edit title, description or the deprecated flag
    #[inline]
    pub fn set_meta(&mut self, meta: SchemaMeta) {
        self.meta.set(meta);
    }

    /// Committed properties
    #[inline]
    #[must_use]
    pub fn properties(&self) -> &[NodeKey] {
        self.properties.committed()
    }

    /// Pending properties
    #[inline]
    #[must_use]
    pub fn draft_properties(&self) -> &[NodeKey] {
        self.properties.draft()
    }

    /// Properties in either view
    #[inline]
    #[must_use]
    pub fn properties_in(&self, view: View) -> &[NodeKey] {
        self.properties.get(view)
    }

    pub(crate) fn draft_position(&self, child: NodeKey) -> Option<usize> {
        self.properties.draft().iter().position(|key| *key == child)
    }

    pub(crate) fn insert_draft(&mut self, index: usize, child: NodeKey) {
        self.properties.draft_mut().insert(index, child);
    }

    pub(crate) fn remove_draft(&mut self, child: NodeKey) -> bool {
        match self.draft_position(child) {
            Some(index) => {
                self.properties.draft_mut().remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn replace_draft(&mut self, old: NodeKey, new: NodeKey) -> bool {
        match self.draft_position(old) {
            Some(index) => {
                self.properties.draft_mut()[index] = new;
                true
            }
            None => false,
        }
    }
}

impl NodeStore for ObjectNodeStore {
    fn node_state(&self) -> &Draft<NodeState> {
        &self.state
    }

    fn node_state_mut(&mut self) -> &mut Draft<NodeState> {
        &mut self.state
    }

    fn fields_dirty(&self) -> bool {
        self.properties.is_dirty() || self.meta.is_dirty()
    }

    fn submit_fields(&mut self) {
        self.properties.submit();
        self.meta.submit();
    }

    fn reset_fields(&mut self) {
        self.properties.reset();
        self.meta.reset();
    }
}

/// Array field; the item node and annotations are dual-state
#[derive(Debug, Clone)]
pub struct ArrayNodeStore {
    state: Draft<NodeState>,
    items: Draft<NodeKey>,
    meta: Draft<SchemaMeta>,
}

impl ArrayNodeStore {
    /// Array of `items`
    #[must_use]
    pub fn new(items: NodeKey) -> Self {
        Self {
            state: Draft::default(),
            items: Draft::new(items),
            meta: Draft::default(),
        }
    }

    /// With annotations
    #[inline]
    #[must_use]
    pub fn with_meta(mut self, meta: SchemaMeta) -> Self {
        self.meta = Draft::new(meta);
        self
    }

    /// Committed annotations
    #[inline]
    #[must_use]
    pub fn meta(&self) -> &SchemaMeta {
        self.meta.committed()
    }

    /// Pending annotations
    #[inline]
    #[must_use]
    pub fn draft_meta(&self) -> &SchemaMeta {
        self.meta.draft()
    }

    /// Annotations in either view
    #[inline]
    #[must_use]
    pub fn meta_in(&self, view: View) -> &SchemaMeta {
        self.meta.get(view)
    }

    /// Edit title, description or the deprecated flag
    #[inline]
    pub fn set_meta(&mut self, meta: SchemaMeta) {
        self.meta.set(meta);
    }

    /// Committed item node
    #[inline]
    #[must_use]
    pub fn items(&self) -> NodeKey {
        *self.items.committed()
    }

    /// Pending item node
    #[inline]
    #[must_use]
    pub fn draft_items(&self) -> NodeKey {
        *self.items.draft()
    }

    /// Item node in either view
    #[inline]
    #[must_use]
    pub fn items_in(&self, view: View) -> NodeKey {
        *self.items.get(view)
    }

    pub(crate) fn set_draft_items(&mut self, items: NodeKey) {
        self.items.set(items);
    }
}

impl NodeStore for ArrayNodeStore {
    fn node_state(&self) -> &Draft<NodeState> {
        &self.state
    }

    fn node_state_mut(&mut self) -> &mut Draft<NodeState> {
        &mut self.state
    }

    fn fields_dirty(&self) -> bool {
        self.items.is_dirty() || self.meta.is_dirty()
    }

    fn submit_fields(&mut self) {
        self.items.submit();
        self.meta.submit();
    }

    fn reset_fields(&mut self) {
        self.items.reset();
        self.meta.reset();
    }
}

/// Any editor node
#[derive(Debug, Clone)]
pub enum DraftNode {
    /// Object field
    Object(ObjectNodeStore),
    /// Array field
    Array(ArrayNodeStore),
    /// String field
    String(StringNodeStore),
    /// Number field
    Number(NumberNodeStore),
    /// Boolean field
    Boolean(BooleanNodeStore),
    /// Opaque `$ref` field
    Ref(RefNodeStore),
}

impl DraftNode {
    /// Schema type, `None` for refs
    #[must_use]
    pub fn schema_type(&self) -> Option<SchemaType> {
        match self {
            Self::Object(_) => Some(SchemaType::Object),
            Self::Array(_) => Some(SchemaType::Array),
            Self::String(_) => Some(SchemaType::String),
            Self::Number(_) => Some(SchemaType::Number),
            Self::Boolean(_) => Some(SchemaType::Boolean),
            Self::Ref(_) => None,
        }
    }

    /// Object payload
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectNodeStore> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    pub(crate) fn as_object_mut(&mut self) -> Option<&mut ObjectNodeStore> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Array payload
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&ArrayNodeStore> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }

    pub(crate) fn as_array_mut(&mut self) -> Option<&mut ArrayNodeStore> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }

    /// String payload for edits
    #[inline]
    pub fn as_string_mut(&mut self) -> Option<&mut StringNodeStore> {
        match self {
            Self::String(string) => Some(string),
            _ => None,
        }
    }

    /// Number payload for edits
    #[inline]
    pub fn as_number_mut(&mut self) -> Option<&mut NumberNodeStore> {
        match self {
            Self::Number(number) => Some(number),
            _ => None,
        }
    }

    /// Boolean payload for edits
    #[inline]
    pub fn as_boolean_mut(&mut self) -> Option<&mut BooleanNodeStore> {
        match self {
            Self::Boolean(boolean) => Some(boolean),
            _ => None,
        }
    }

    fn store(&self) -> &dyn NodeFields {
        match self {
            Self::Object(node) => node,
            Self::Array(node) => node,
            Self::String(node) => node,
            Self::Number(node) => node,
            Self::Boolean(node) => node,
            Self::Ref(node) => node,
        }
    }

    fn store_mut(&mut self) -> &mut dyn NodeFields {
        match self {
            Self::Object(node) => node,
            Self::Array(node) => node,
            Self::String(node) => node,
            Self::Number(node) => node,
            Self::Boolean(node) => node,
            Self::Ref(node) => node,
        }
    }
}

/// Object-safe subset of [`NodeStore`] used for dispatch
trait NodeFields {
    fn state(&self) -> &Draft<NodeState>;
    fn state_mut(&mut self) -> &mut Draft<NodeState>;
    fn dirty(&self) -> bool;
    fn submit(&mut self);
    fn reset(&mut self);
}

impl<T: NodeStore> NodeFields for T {
    fn state(&self) -> &Draft<NodeState> {
        self.node_state()
    }

    fn state_mut(&mut self) -> &mut Draft<NodeState> {
        self.node_state_mut()
    }

    fn dirty(&self) -> bool {
        self.fields_dirty()
    }

    fn submit(&mut self) {
        self.submit_fields();
    }

    fn reset(&mut self) {
        self.reset_fields();
    }
}

impl NodeStore for DraftNode {
    fn node_state(&self) -> &Draft<NodeState> {
        self.store().state()
    }

    fn node_state_mut(&mut self) -> &mut Draft<NodeState> {
        self.store_mut().state_mut()
    }

    fn fields_dirty(&self) -> bool {
        self.store().dirty()
    }

    fn submit_fields(&mut self) {
        self.store_mut().submit();
    }

    fn reset_fields(&mut self) {
        self.store_mut().reset();
    }
}

impl From<ObjectNodeStore> for DraftNode {
    fn from(node: ObjectNodeStore) -> Self {
        Self::Object(node)
    }
}

impl From<ArrayNodeStore> for DraftNode {
    fn from(node: ArrayNodeStore) -> Self {
        Self::Array(node)
    }
}

impl From<StringNodeStore> for DraftNode {
    fn from(node: StringNodeStore) -> Self {
        Self::String(node)
    }
}

impl From<NumberNodeStore> for DraftNode {
    fn from(node: NumberNodeStore) -> Self {
        Self::Number(node)
    }
}

impl From<BooleanNodeStore> for DraftNode {
    fn from(node: BooleanNodeStore) -> Self {
        Self::Boolean(node)
    }
}

impl From<RefNodeStore> for DraftNode {
    fn from(node: RefNodeStore) -> Self {
        Self::Ref(node)
    }
}
