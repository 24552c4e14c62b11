//! Schema editor root
//!
//! Owns every node of one editing session in an arena. Structure lives in
//! the nodes themselves (object properties, array items, parent links),
//! each in committed and draft form, so the committed tree and the draft
//! tree can share unchanged nodes.

use revisium_schema::{
    JsonArraySchema, JsonObjectSchema, JsonPointer, JsonSchema, SchemaError, ITEMS, PROPERTIES,
};
use serde::{Deserialize, Serialize};

use crate::draft::{Draft, View};
use crate::error::{DraftError, DraftResult};
use crate::leaf::{BooleanNodeStore, NumberNodeStore, RefNodeStore, StringNodeStore};
use crate::node::{ArrayNodeStore, DraftNode, ObjectNodeStore};
use crate::store::{NodeKey, NodeStore};

/// Where [`RootNodeStore::add_property`] inserts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Position {
    /// After the last property
    #[default]
    Append,
    /// Immediately before a sibling
    Before(NodeKey),
    /// Immediately after a sibling
    After(NodeKey),
}

/// Editing session over one schema
#[derive(Debug, Clone)]
pub struct RootNodeStore {
    nodes: Vec<DraftNode>,
    root: Draft<NodeKey>,
}

impl RootNodeStore {
    /// Session whose committed schema is `root` alone
    #[must_use]
    pub fn new(root: impl Into<DraftNode>) -> Self {
        Self {
            nodes: vec![root.into()],
            root: Draft::new(NodeKey(0)),
        }
    }

    /// Session whose committed schema is `schema` (`createSchemaNode`)
    ///
    /// `$ref` fields stay opaque [`RefNodeStore`]s.
    #[must_use]
    pub fn from_schema(schema: &JsonSchema) -> Self {
        let mut store = Self {
            nodes: Vec::new(),
            root: Draft::new(NodeKey(0)),
        };
        let root = store.build(schema);
        store.root = Draft::new(root);
        store.submit_changes();
        tracing::debug!("Loaded schema editor with {} nodes", store.nodes.len());
        store
    }

    /// Current root
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeKey {
        *self.root.draft()
    }

    /// Last submitted root
    #[inline]
    #[must_use]
    pub fn committed_root(&self) -> NodeKey {
        *self.root.committed()
    }

    /// Root in either view
    #[inline]
    #[must_use]
    pub fn root_in(&self, view: View) -> NodeKey {
        *self.root.get(view)
    }

    /// Node by key
    #[inline]
    #[must_use]
    pub fn node(&self, key: NodeKey) -> Option<&DraftNode> {
        self.nodes.get(key.0)
    }

    /// Node by key, for field edits
    #[inline]
    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut DraftNode> {
        self.nodes.get_mut(key.0)
    }

    /// Arena size, detached nodes included
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// No nodes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn get(&self, key: NodeKey) -> DraftResult<&DraftNode> {
        self.nodes.get(key.0).ok_or(DraftError::UnknownNode(key))
    }

    fn get_mut(&mut self, key: NodeKey) -> DraftResult<&mut DraftNode> {
        self.nodes.get_mut(key.0).ok_or(DraftError::UnknownNode(key))
    }

    /// Add a detached node
    pub fn insert(&mut self, node: impl Into<DraftNode>) -> NodeKey {
        let key = NodeKey(self.nodes.len());
        self.nodes.push(node.into());
        key
    }

    /// Add a detached subtree built from `schema`
    ///
    /// Property ids and parent links are pending until submitted.
    pub fn insert_schema(&mut self, schema: &JsonSchema) -> NodeKey {
        self.build(schema)
    }

    fn build(&mut self, schema: &JsonSchema) -> NodeKey {
        match schema {
            JsonSchema::Object(object) => {
                let children: Vec<NodeKey> = object
                    .properties
                    .iter()
                    .map(|(name, child)| {
                        let key = self.build(child);
                        self.nodes[key.0].set_id(name.clone());
                        key
                    })
                    .collect();

                let mut store = ObjectNodeStore::new().with_meta(object.meta.clone());
                for (index, child) in children.iter().enumerate() {
                    store.insert_draft(index, *child);
                }
                let key = self.insert(store);
                for child in children {
                    self.nodes[child.0].set_parent(key);
                }
                key
            }
            JsonSchema::Array(array) => {
                let items = self.build(&array.items);
                let key = self.insert(ArrayNodeStore::new(items).with_meta(array.meta.clone()));
                self.nodes[items.0].set_parent(key);
                key
            }
            JsonSchema::String(s) => self.insert(StringNodeStore::from_schema(s)),
            JsonSchema::Number(s) => self.insert(NumberNodeStore::from_schema(s)),
            JsonSchema::Boolean(s) => self.insert(BooleanNodeStore::from_schema(s)),
            JsonSchema::Ref(site) => self.insert(RefNodeStore::from_schema(site)),
        }
    }

    /// Draft property of `object` named `name`
    #[must_use]
    pub fn child(&self, object: NodeKey, name: &str) -> Option<NodeKey> {
        self.node(object)?
            .as_object()?
            .draft_properties()
            .iter()
            .copied()
            .find(|key| self.nodes[key.0].draft_id() == name)
    }

    /// Draft node at a schema pointer (`/properties/a/items`)
    #[must_use]
    pub fn find(&self, pointer: &JsonPointer) -> Option<NodeKey> {
        let mut key = self.root();
        let mut segments = pointer.iter();
        while let Some(segment) = segments.next() {
            let node = self.node(key)?;
            key = match segment {
                PROPERTIES => self.child(key, segments.next()?)?,
                ITEMS => node.as_array()?.draft_items(),
                _ => return None,
            };
        }
        Some(key)
    }

    /// Insert `child` into `object`'s draft properties
    ///
    /// A child attached to another object is moved out of it first.
    ///
    /// # Errors
    /// Returns [`DraftError::NotAnObject`], [`DraftError::AnchorNotFound`]
    /// for a `position` naming a non-sibling, or
    /// [`SchemaError::DuplicateProperty`] when a sibling has the same id.
    pub fn add_property(
        &mut self,
        object: NodeKey,
        child: NodeKey,
        position: Position,
    ) -> DraftResult<()> {
        let name = self.get(child)?.draft_id().to_string();
        self.ensure_unique(object, child, &name)?;
        self.ensure_not_nested(child, object)?;
        if let Position::Before(anchor) | Position::After(anchor) = position {
            let siblings = self.children_in(object, View::Draft);
            if anchor == child || !siblings.contains(&anchor) {
                return Err(DraftError::AnchorNotFound(anchor));
            }
        }
        self.detach(child)?;

        let store = self
            .get_mut(object)?
            .as_object_mut()
            .ok_or(DraftError::NotAnObject(object))?;
        let index = match position {
            Position::Append => store.draft_properties().len(),
            Position::Before(anchor) => store
                .draft_position(anchor)
                .ok_or(DraftError::AnchorNotFound(anchor))?,
            Position::After(anchor) => {
                store
                    .draft_position(anchor)
                    .ok_or(DraftError::AnchorNotFound(anchor))?
                    + 1
            }
        };
        store.insert_draft(index, child);
        self.nodes[child.0].set_parent(object);
        Ok(())
    }

    /// Take `child` out of `object`'s draft properties
    ///
    /// # Errors
    /// Returns [`DraftError::NotAnObject`] or [`DraftError::NotAChild`].
    pub fn remove_property(&mut self, object: NodeKey, child: NodeKey) -> DraftResult<()> {
        self.get(child)?;
        let store = self
            .get_mut(object)?
            .as_object_mut()
            .ok_or(DraftError::NotAnObject(object))?;
        if !store.remove_draft(child) {
            return Err(DraftError::NotAChild {
                parent: object,
                child,
            });
        }
        self.nodes[child.0].on_remove_from_parent();
        Ok(())
    }

    /// Rename a node, rejecting names taken by its siblings
    ///
    /// # Errors
    /// Returns [`SchemaError::DuplicateProperty`] for a taken name.
    pub fn rename(&mut self, key: NodeKey, name: impl Into<String>) -> DraftResult<()> {
        let name = name.into();
        let node = self.get(key)?;
        if let (Some(parent), true) = (node.draft_parent(), node.draft_connected_to_parent()) {
            self.ensure_unique(parent, key, &name)?;
        }
        self.nodes[key.0].set_id(name);
        Ok(())
    }

    /// Swap the whole root, e.g. on a root type change
    ///
    /// # Errors
    /// Returns [`DraftError::UnknownNode`] for a foreign key.
    pub fn replace_node(&mut self, node: NodeKey) -> DraftResult<()> {
        self.detach(node)?;
        self.root.set(node);
        Ok(())
    }

    /// Put `new` in place of `old` under the same name
    ///
    /// # Errors
    /// Returns [`DraftError::NotAnObject`] or [`DraftError::NotAChild`].
    pub fn replace_property(
        &mut self,
        object: NodeKey,
        old: NodeKey,
        new: NodeKey,
    ) -> DraftResult<()> {
        let name = self.get(old)?.draft_id().to_string();
        self.get(new)?;
        if self.get(object)?.as_object().is_none() {
            return Err(DraftError::NotAnObject(object));
        }
        self.ensure_not_nested(new, object)?;
        self.detach(new)?;

        let store = self
            .get_mut(object)?
            .as_object_mut()
            .ok_or(DraftError::NotAnObject(object))?;
        if !store.replace_draft(old, new) {
            return Err(DraftError::NotAChild {
                parent: object,
                child: old,
            });
        }
        self.nodes[old.0].on_remove_from_parent();
        let node = &mut self.nodes[new.0];
        node.set_id(name);
        node.set_parent(object);
        Ok(())
    }

    /// Replace an array's item node
    ///
    /// # Errors
    /// Returns [`DraftError::NotAnArray`].
    pub fn set_items(&mut self, array: NodeKey, items: NodeKey) -> DraftResult<()> {
        self.get(items)?;
        if self.get(array)?.as_array().is_none() {
            return Err(DraftError::NotAnArray(array));
        }
        self.ensure_not_nested(items, array)?;
        if self.get(array)?.as_array().map(ArrayNodeStore::draft_items) != Some(items) {
            self.detach(items)?;
        }

        let store = self
            .get_mut(array)?
            .as_array_mut()
            .ok_or(DraftError::NotAnArray(array))?;
        let old = store.draft_items();
        store.set_draft_items(items);
        if old != items {
            self.nodes[old.0].on_remove_from_parent();
        }
        self.nodes[items.0].set_parent(array);
        Ok(())
    }

    /// Remove `key` from the draft properties of the object it is attached to
    fn detach(&mut self, key: NodeKey) -> DraftResult<()> {
        let node = self.get(key)?;
        let Some(parent) = node.draft_parent() else {
            return Ok(());
        };
        if !node.draft_connected_to_parent() {
            return Ok(());
        }
        match &mut self.nodes[parent.0] {
            DraftNode::Object(object) => {
                if object.remove_draft(key) {
                    self.nodes[key.0].on_remove_from_parent();
                }
                Ok(())
            }
            DraftNode::Array(array) if array.draft_items() == key => {
                Err(DraftError::ArrayItems(key))
            }
            _ => Ok(()),
        }
    }

    fn ensure_unique(&self, object: NodeKey, child: NodeKey, name: &str) -> DraftResult<()> {
        let store = self
            .get(object)?
            .as_object()
            .ok_or(DraftError::NotAnObject(object))?;
        let taken = store
            .draft_properties()
            .iter()
            .any(|key| *key != child && self.nodes[key.0].draft_id() == name);
        if taken {
            return Err(SchemaError::DuplicateProperty(name.to_string()).into());
        }
        Ok(())
    }

    /// `node` must not become its own descendant under `parent`
    fn ensure_not_nested(&self, node: NodeKey, parent: NodeKey) -> DraftResult<()> {
        let mut current = Some(parent);
        for _ in 0..=self.nodes.len() {
            let Some(key) = current else {
                return Ok(());
            };
            if key == node {
                return Err(DraftError::Nested(node));
            }
            let state = self.get(key)?.node_state().draft();
            current = state.parent.filter(|_| state.connected_to_parent);
        }
        Err(DraftError::Nested(node))
    }

    /// Promote every pending edit
    pub fn submit_changes(&mut self) {
        for node in &mut self.nodes {
            node.submit_changes();
        }
        self.root.submit();
        tracing::debug!("Submitted schema editor changes");
    }

    /// Discard every pending edit
    pub fn reset_changes(&mut self) {
        for node in &mut self.nodes {
            node.reset_changes();
        }
        self.root.reset();
        tracing::debug!("Reset schema editor changes");
    }

    /// Root swapped, or any node of the draft tree has pending edits
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.root.is_dirty() || self.is_node_dirty(self.root())
    }

    /// Node or any draft descendant has pending edits
    #[must_use]
    pub fn is_node_dirty(&self, key: NodeKey) -> bool {
        let Some(node) = self.node(key) else {
            return false;
        };
        node.is_dirty_itself()
            || self
                .children_in(key, View::Draft)
                .into_iter()
                .any(|child| self.is_node_dirty(child))
    }

    /// Properties or item node of `key`
    pub(crate) fn children_in(&self, key: NodeKey, view: View) -> Vec<NodeKey> {
        match &self.nodes[key.0] {
            DraftNode::Object(object) => object.properties_in(view).to_vec(),
            DraftNode::Array(array) => vec![array.items_in(view)],
            _ => Vec::new(),
        }
    }

    /// Pending schema (`getSchema`)
    #[must_use]
    pub fn get_schema(&self) -> JsonSchema {
        self.schema_with(self.root(), View::Draft, &|_| false)
    }

    /// Last submitted schema
    #[must_use]
    pub fn get_committed_schema(&self) -> JsonSchema {
        self.schema_with(self.committed_root(), View::Committed, &|_| false)
    }

    /// Pending schema of one node
    ///
    /// # Errors
    /// Returns [`DraftError::UnknownNode`] for a foreign key.
    pub fn node_schema(&self, key: NodeKey) -> DraftResult<JsonSchema> {
        self.get(key)?;
        Ok(self.schema_with(key, View::Draft, &|_| false))
    }

    /// Schema of `key` leaving out object properties matched by `skip`
    pub(crate) fn schema_with(
        &self,
        key: NodeKey,
        view: View,
        skip: &dyn Fn(NodeKey) -> bool,
    ) -> JsonSchema {
        match &self.nodes[key.0] {
            DraftNode::Object(object) => {
                let properties: indexmap::IndexMap<String, JsonSchema> = object
                    .properties_in(view)
                    .iter()
                    .filter(|child| !skip(**child))
                    .map(|child| {
                        (
                            self.nodes[child.0].id_in(view).to_string(),
                            self.schema_with(*child, view, skip),
                        )
                    })
                    .collect();
                let mut required: Vec<String> = properties.keys().cloned().collect();
                required.sort();
                JsonObjectSchema {
                    properties,
                    additional_properties: false,
                    required,
                    meta: object.meta_in(view).clone(),
                }
                .into()
            }
            DraftNode::Array(array) => JsonArraySchema {
                items: Box::new(self.schema_with(array.items_in(view), view, skip)),
                meta: array.meta_in(view).clone(),
            }
            .into(),
            DraftNode::String(string) => string.schema(view).into(),
            DraftNode::Number(number) => number.schema(view).into(),
            DraftNode::Boolean(boolean) => boolean.schema(view).into(),
            DraftNode::Ref(reference) => reference.get_schema(),
        }
    }

    /// Schema pointer of a node in either view, `None` when not in that tree
    #[must_use]
    pub fn node_path(&self, key: NodeKey, view: View) -> Option<JsonPointer> {
        let mut segments = Vec::new();
        let mut current = key;

        while current != self.root_in(view) {
            let state = self.node(current)?.node_state().get(view);
            let parent = state.parent.filter(|_| state.connected_to_parent)?;
            match self.node(parent)? {
                DraftNode::Object(object) if object.properties_in(view).contains(&current) => {
                    segments.push(state.id.clone());
                    segments.push(PROPERTIES.to_string());
                }
                DraftNode::Array(array) if array.items_in(view) == current => {
                    segments.push(ITEMS.to_string());
                }
                _ => return None,
            }
            current = parent;
        }

        segments.reverse();
        Some(JsonPointer::new(segments))
    }
}

/// Editor loaded from `schema` (`createSchemaNode`)
#[must_use]
pub fn create_schema_node(schema: &JsonSchema) -> RootNodeStore {
    RootNodeStore::from_schema(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use revisium_test_utils::post_schema;

    #[test]
    fn load_round_trips() {
        let store = RootNodeStore::from_schema(&post_schema());
        assert_eq!(store.get_schema(), post_schema());
        assert_eq!(store.get_committed_schema(), post_schema());
        assert!(!store.is_dirty());
    }

    #[test]
    fn find_and_paths() {
        let store = RootNodeStore::from_schema(&post_schema());
        let pointer: JsonPointer = "/properties/comments/items/properties/by".parse().unwrap();
        let by = store.find(&pointer).unwrap();

        assert_eq!(store.node(by).unwrap().draft_id(), "by");
        assert_eq!(store.node_path(by, View::Draft), Some(pointer.clone()));
        assert_eq!(store.node_path(by, View::Committed), Some(pointer));
        assert_eq!(store.node_path(store.root(), View::Draft), Some(JsonPointer::root()));
    }

    #[test]
    fn add_property_positions() {
        let mut store = RootNodeStore::new(ObjectNodeStore::new());
        let root = store.root();
        let mut names = Vec::new();
        for name in ["b", "d", "a", "c"] {
            let key = store.insert(StringNodeStore::new());
            store.node_mut(key).unwrap().set_id(name);
            names.push(key);
        }
        let [b, d, a, c] = [names[0], names[1], names[2], names[3]];

        store.add_property(root, b, Position::Append).unwrap();
        store.add_property(root, d, Position::Append).unwrap();
        store.add_property(root, a, Position::Before(b)).unwrap();
        store.add_property(root, c, Position::After(b)).unwrap();

        let order: Vec<&str> = store
            .node(root)
            .unwrap()
            .as_object()
            .unwrap()
            .draft_properties()
            .iter()
            .map(|key| store.node(*key).unwrap().draft_id())
            .collect();
        assert_eq!(order, ["a", "b", "c", "d"]);
        assert!(store.is_dirty());
    }

    #[test]
    fn add_property_errors() {
        let mut store = RootNodeStore::from_schema(&post_schema());
        let root = store.root();
        let title = store.child(root, "title").unwrap();

        let dup = store.insert(NumberNodeStore::new());
        store.node_mut(dup).unwrap().set_id("title");
        assert!(matches!(
            store.add_property(root, dup, Position::Append),
            Err(DraftError::Schema(SchemaError::DuplicateProperty(name))) if name == "title"
        ));

        let fresh = store.insert(NumberNodeStore::new());
        assert!(matches!(
            store.add_property(title, fresh, Position::Append),
            Err(DraftError::NotAnObject(key)) if key == title
        ));

        let other = store.insert(NumberNodeStore::new());
        assert!(matches!(
            store.add_property(root, fresh, Position::After(other)),
            Err(DraftError::AnchorNotFound(key)) if key == other
        ));
        assert!(matches!(
            store.remove_property(root, other),
            Err(DraftError::NotAChild { .. })
        ));
    }

    #[test]
    fn remove_then_reset_restores() {
        let mut store = RootNodeStore::from_schema(&post_schema());
        let root = store.root();
        let views = store.child(root, "views").unwrap();

        store.remove_property(root, views).unwrap();
        assert!(!store.node(views).unwrap().draft_connected_to_parent());
        assert!(store.is_dirty());
        assert_eq!(store.node_path(views, View::Draft), None);

        store.reset_changes();
        assert!(!store.is_dirty());
        assert_eq!(store.get_schema(), post_schema());
    }

    #[test]
    fn add_moves_between_objects() {
        let schema = revisium_test_utils::object_schema([
            ("a", revisium_test_utils::object_schema([("x", revisium_test_utils::string_schema())])),
            ("b", JsonObjectSchema::new().into()),
        ]);
        let mut store = RootNodeStore::from_schema(&schema);
        let root = store.root();
        let a = store.child(root, "a").unwrap();
        let b = store.child(root, "b").unwrap();
        let x = store.child(a, "x").unwrap();

        store.add_property(b, x, Position::Append).unwrap();
        assert_eq!(store.child(a, "x"), None);
        assert_eq!(store.child(b, "x"), Some(x));
        assert_eq!(
            store.node_path(x, View::Committed).unwrap().to_string(),
            "/properties/a/properties/x"
        );
        assert_eq!(
            store.node_path(x, View::Draft).unwrap().to_string(),
            "/properties/b/properties/x"
        );
    }

    #[test]
    fn rename_rejects_sibling_name() {
        let mut store = RootNodeStore::from_schema(&post_schema());
        let root = store.root();
        let title = store.child(root, "title").unwrap();
        assert!(store.rename(title, "views").is_err());
        store.rename(title, "headline").unwrap();
        assert_eq!(store.child(root, "headline"), Some(title));
    }

    #[test]
    fn nesting_into_descendant_rejected() {
        let mut store = RootNodeStore::from_schema(&post_schema());
        let root = store.root();
        let comments = store.child(root, "comments").unwrap();
        let item = store.find(&"/properties/comments/items".parse().unwrap()).unwrap();

        assert!(matches!(
            store.add_property(item, comments, Position::Append),
            Err(DraftError::Nested(key)) if key == comments
        ));
        assert_eq!(store.child(root, "comments"), Some(comments));
    }

    #[test]
    fn set_items_swaps_item_node() {
        let mut store = RootNodeStore::from_schema(&post_schema());
        let tags = store.find(&"/properties/tags".parse().unwrap()).unwrap();
        let number = store.insert(NumberNodeStore::new());

        store.set_items(tags, number).unwrap();
        assert_eq!(
            store.node_schema(tags).unwrap(),
            JsonArraySchema::new(revisium_schema::JsonNumberSchema::new()).into()
        );
        assert!(matches!(
            store.set_items(store.root(), number),
            Err(DraftError::NotAnArray(_))
        ));
    }
}
