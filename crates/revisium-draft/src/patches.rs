//! JSON Patch emission
//!
//! Patches are computed by replaying them against a model of the
//! committed document: every emitted path is the location the node has
//! at that point of the sequence, so the list applies in order.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use revisium_schema::{JsonPatch, JsonPointer, JsonSchema};

use crate::draft::View;
use crate::node::DraftNode;
use crate::root::RootNodeStore;
use crate::store::{NodeKey, NodeStore};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Property(String),
    Items,
}

/// Node layout of the document as patched so far
#[derive(Debug, Default)]
struct Document {
    members: HashSet<NodeKey>,
    location: HashMap<NodeKey, (NodeKey, Slot)>,
    properties: HashMap<NodeKey, IndexMap<String, NodeKey>>,
    /// `None` while the array holds content not backed by a node
    items: HashMap<NodeKey, Option<NodeKey>>,
}

impl Document {
    fn committed(store: &RootNodeStore) -> Self {
        let mut document = Self::default();
        document.load(store, store.committed_root());
        document
    }

    fn load(&mut self, store: &RootNodeStore, key: NodeKey) {
        self.members.insert(key);
        match store.node(key) {
            Some(DraftNode::Object(object)) => {
                self.properties.insert(key, IndexMap::new());
                for child in object.properties() {
                    let name = store.node(*child).map_or("", |node| node.id()).to_string();
                    self.load(store, *child);
                    self.attach(*child, key, Slot::Property(name));
                }
            }
            Some(DraftNode::Array(array)) => {
                self.items.insert(key, None);
                self.load(store, array.items());
                self.attach(array.items(), key, Slot::Items);
            }
            _ => {}
        }
    }

    fn contains(&self, key: NodeKey) -> bool {
        self.members.contains(&key)
    }

    fn child(&self, object: NodeKey, name: &str) -> Option<NodeKey> {
        self.properties.get(&object)?.get(name).copied()
    }

    fn items(&self, array: NodeKey) -> Option<NodeKey> {
        self.items.get(&array).copied().flatten()
    }

    fn is_at(&self, key: NodeKey, parent: NodeKey, name: &str) -> bool {
        matches!(
            self.location.get(&key),
            Some((at, Slot::Property(at_name))) if *at == parent && at_name == name
        )
    }

    fn path(&self, key: NodeKey) -> JsonPointer {
        let mut segments = Vec::new();
        let mut current = key;
        while let Some((parent, slot)) = self.location.get(&current) {
            match slot {
                Slot::Property(name) => {
                    segments.push(name.clone());
                    segments.push(revisium_schema::PROPERTIES.to_string());
                }
                Slot::Items => segments.push(revisium_schema::ITEMS.to_string()),
            }
            current = *parent;
        }
        segments.reverse();
        JsonPointer::new(segments)
    }

    fn attach(&mut self, key: NodeKey, parent: NodeKey, slot: Slot) {
        match &slot {
            Slot::Property(name) => {
                self.properties
                    .entry(parent)
                    .or_default()
                    .insert(name.clone(), key);
            }
            Slot::Items => {
                self.items.insert(parent, Some(key));
            }
        }
        self.location.insert(key, (parent, slot));
    }

    fn detach(&mut self, key: NodeKey) {
        let Some((parent, slot)) = self.location.remove(&key) else {
            return;
        };
        match slot {
            Slot::Property(name) => {
                if let Some(properties) = self.properties.get_mut(&parent) {
                    properties.shift_remove(&name);
                }
            }
            Slot::Items => {
                self.items.insert(parent, None);
            }
        }
    }

    fn remove_subtree(&mut self, key: NodeKey) {
        self.detach(key);
        self.drop_node(key);
    }

    fn drop_node(&mut self, key: NodeKey) {
        self.members.remove(&key);
        self.location.remove(&key);
        if let Some(properties) = self.properties.remove(&key) {
            for child in properties.into_values() {
                self.drop_node(child);
            }
        }
        if let Some(Some(item)) = self.items.remove(&key) {
            self.drop_node(item);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Write {
    Add,
    Replace,
}

struct Emitter<'a> {
    store: &'a RootNodeStore,
    document: Document,
    in_draft: HashSet<NodeKey>,
    added: HashSet<NodeKey>,
    patches: Vec<JsonPatch>,
}

impl<'a> Emitter<'a> {
    fn new(store: &'a RootNodeStore) -> Self {
        let mut in_draft = HashSet::new();
        let mut stack = vec![store.root()];
        while let Some(key) = stack.pop() {
            if in_draft.insert(key) {
                stack.extend(store.children_in(key, View::Draft));
            }
        }

        Self {
            store,
            document: Document::committed(store),
            in_draft,
            added: HashSet::new(),
            patches: Vec::new(),
        }
    }

    fn draft_name(&self, key: NodeKey) -> String {
        self.store
            .node(key)
            .map_or("", |node| node.draft_id())
            .to_string()
    }

    fn visit(&mut self, key: NodeKey) {
        if !self.added.contains(&key) {
            self.leaf_changes(key);
        }
        match self.store.node(key) {
            Some(DraftNode::Object(_)) => self.visit_object(key),
            Some(DraftNode::Array(_)) => self.visit_array(key),
            _ => {}
        }
        for child in self.store.children_in(key, View::Draft) {
            self.visit(child);
        }
    }

    fn leaf_changes(&mut self, key: NodeKey) {
        let changed = match self.store.node(key) {
            Some(DraftNode::String(node)) => node.fields_dirty(),
            Some(DraftNode::Number(node)) => node.fields_dirty(),
            Some(DraftNode::Boolean(node)) => node.fields_dirty(),
            _ => false,
        };
        if changed {
            let value = self.store.schema_with(key, View::Draft, &|_| false);
            self.patches
                .push(JsonPatch::replace(self.document.path(key), value));
        }
    }

    /// Rewrite composites whose annotations changed
    ///
    /// Runs once the document matches the draft, so the rewritten
    /// subtree carries only the annotation change.
    fn meta_changes(&mut self, key: NodeKey) {
        let changed = match self.store.node(key) {
            Some(DraftNode::Object(object)) => object.meta() != object.draft_meta(),
            Some(DraftNode::Array(array)) => array.meta() != array.draft_meta(),
            _ => false,
        };
        if changed && !self.added.contains(&key) {
            let value = self.store.schema_with(key, View::Draft, &|_| false);
            self.patches
                .push(JsonPatch::replace(self.document.path(key), value));
            return;
        }
        for child in self.store.children_in(key, View::Draft) {
            self.meta_changes(child);
        }
    }

    fn visit_object(&mut self, key: NodeKey) {
        let draft: Vec<(String, NodeKey)> = self
            .store
            .children_in(key, View::Draft)
            .into_iter()
            .map(|child| (self.draft_name(child), child))
            .collect();
        let draft_keys: HashSet<NodeKey> = draft.iter().map(|(_, child)| *child).collect();
        let base = self.document.path(key);

        // Removals, unless a new property takes over the name
        let current: Vec<(String, NodeKey)> = self
            .document
            .properties
            .get(&key)
            .map(|properties| {
                properties
                    .iter()
                    .map(|(name, child)| (name.clone(), *child))
                    .collect()
            })
            .unwrap_or_default();
        for (name, child) in current {
            if self.in_draft.contains(&child) {
                continue;
            }
            let taken_over = draft
                .iter()
                .any(|(draft_name, draft_child)| {
                    *draft_name == name && !self.document.contains(*draft_child)
                });
            if !taken_over {
                self.patches.push(JsonPatch::remove(base.property(&name)));
                self.document.remove_subtree(child);
            }
        }

        // Same-name replacements
        for (name, child) in &draft {
            if self.document.contains(*child) {
                continue;
            }
            if let Some(occupant) = self.document.child(key, name) {
                if !draft_keys.contains(&occupant) {
                    self.document.remove_subtree(occupant);
                    self.place_new(key, Slot::Property(name.clone()), *child, Write::Replace);
                }
            }
        }

        // Moves and renames
        let mut pending: Vec<(String, NodeKey)> = draft
            .iter()
            .filter(|(name, child)| {
                self.document.contains(*child) && !self.document.is_at(*child, key, name)
            })
            .cloned()
            .collect();
        while !pending.is_empty() {
            let ready = pending.iter().position(|(name, _)| {
                self.document
                    .child(key, name)
                    .map_or(true, |occupant| !pending.iter().any(|(_, p)| *p == occupant))
            });
            // A cycle of renames: overwrite one occupant, it is re-added below
            let (name, child) = pending.remove(ready.unwrap_or(0));
            if let Some(occupant) = self.document.child(key, &name) {
                pending.retain(|(_, p)| *p != occupant);
            }
            self.move_property(child, key, &name);
            // Dropped with an overwritten subtree, re-added below
            pending.retain(|(_, p)| self.document.contains(*p));
        }

        // Additions
        for (name, child) in &draft {
            if self.document.contains(*child) {
                continue;
            }
            let write = match self.document.child(key, name) {
                Some(occupant) => {
                    self.document.remove_subtree(occupant);
                    Write::Replace
                }
                None => Write::Add,
            };
            self.place_new(key, Slot::Property(name.clone()), *child, write);
        }
    }

    fn visit_array(&mut self, key: NodeKey) {
        let Some(DraftNode::Array(array)) = self.store.node(key) else {
            return;
        };
        let item = array.draft_items();
        let current = self.document.items(key);
        if current == Some(item) {
            return;
        }

        if self.document.contains(item) {
            let from = self.document.path(item);
            let to = self.document.path(key).items();
            self.document.detach(item);
            if let Some(old) = current {
                self.document.remove_subtree(old);
            }
            self.document.attach(item, key, Slot::Items);
            self.patches.push(JsonPatch::move_to(from, to));
        } else {
            if let Some(old) = current {
                self.document.remove_subtree(old);
            }
            self.place_new(key, Slot::Items, item, Write::Replace);
        }
    }

    fn move_property(&mut self, child: NodeKey, parent: NodeKey, name: &str) {
        let from = self.document.path(child);
        let to = self.document.path(parent).property(name);
        self.document.detach(child);
        if let Some(occupant) = self.document.child(parent, name) {
            self.document.remove_subtree(occupant);
        }
        self.document
            .attach(child, parent, Slot::Property(name.to_string()));
        self.patches.push(JsonPatch::move_to(from, to));
    }

    /// Write a node that is not in the document yet
    ///
    /// Descendants already in the document are left out of the value;
    /// they are moved in when their new parent is visited.
    fn place_new(&mut self, parent: NodeKey, slot: Slot, child: NodeKey, write: Write) {
        let mut path = self.document.path(parent);
        match &slot {
            Slot::Property(name) => path = path.property(name.as_str()),
            Slot::Items => path = path.items(),
        }

        let document = &self.document;
        let value: JsonSchema = self
            .store
            .schema_with(child, View::Draft, &|key| document.contains(key));
        self.patches.push(match write {
            Write::Add => JsonPatch::add(path, value),
            Write::Replace => JsonPatch::replace(path, value),
        });
        self.insert_subtree(child, parent, slot);
    }

    fn insert_subtree(&mut self, key: NodeKey, parent: NodeKey, slot: Slot) {
        self.document.members.insert(key);
        self.added.insert(key);
        self.document.attach(key, parent, slot);

        let store = self.store;
        match store.node(key) {
            Some(DraftNode::Object(object)) => {
                self.document.properties.entry(key).or_default();
                for child in object.draft_properties() {
                    if !self.document.contains(*child) {
                        let name = self.draft_name(*child);
                        self.insert_subtree(*child, key, Slot::Property(name));
                    }
                }
            }
            Some(DraftNode::Array(array)) => {
                self.document.items.insert(key, None);
                let item = array.draft_items();
                if !self.document.contains(item) {
                    self.insert_subtree(item, key, Slot::Items);
                }
            }
            _ => {}
        }
    }
}

impl RootNodeStore {
    /// Patches turning the committed schema into the draft schema
    ///
    /// A swapped root yields a single `replace` of the whole document.
    /// Otherwise, per object in draft pre-order: removals, same-name
    /// replacements, moves and renames, then additions. Changed leaf
    /// defaults and foreign keys are replaced in place, and a changed
    /// array item node is replaced (or moved in) at `/items`. Objects and
    /// arrays with changed annotations are replaced last.
    #[must_use]
    pub fn get_patches(&self) -> Vec<JsonPatch> {
        let root = self.root();
        if root != self.committed_root() {
            return vec![JsonPatch::replace(JsonPointer::root(), self.get_schema())];
        }

        let mut emitter = Emitter::new(self);
        emitter.visit(root);
        emitter.meta_changes(root);
        tracing::debug!("Computed {} schema patches", emitter.patches.len());
        emitter.patches
    }
}
