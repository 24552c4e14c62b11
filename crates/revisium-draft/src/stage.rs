//! Staging a whole target schema as edits

use revisium_schema::{JsonSchema, JsonStringSchema};

use crate::draft::View;
use crate::error::DraftResult;
use crate::node::DraftNode;
use crate::root::{Position, RootNodeStore};
use crate::store::{NodeKey, NodeStore};

impl RootNodeStore {
    /// Turn the draft into `target` through node edits
    ///
    /// Nodes whose kind and fixed fields still fit are kept and merged, so
    /// [`get_patches`](Self::get_patches) only reports what changed.
    ///
    /// # Errors
    /// Propagates errors of the underlying edits.
    pub fn stage_schema(&mut self, target: &JsonSchema) -> DraftResult<()> {
        let root = self.root();
        if self.fits(root, target)? {
            self.merge(root, target)
        } else {
            let node = self.insert_schema(target);
            tracing::debug!("Staged schema replaces the root");
            self.replace_node(node)
        }
    }

    /// Node can be edited into `target` without being replaced
    fn fits(&self, key: NodeKey, target: &JsonSchema) -> DraftResult<bool> {
        let fits = match (self.get(key)?, target) {
            (DraftNode::Object(_), JsonSchema::Object(_))
            | (DraftNode::Array(_), JsonSchema::Array(_)) => true,
            (DraftNode::String(node), JsonSchema::String(target)) => {
                let current = node.schema(View::Draft);
                fixed_string_fields(&current) == fixed_string_fields(target)
                    && (target.effective_foreign_key().is_none()
                        || current.effective_foreign_key().is_none()
                        || is_legacy(&current) == is_legacy(target))
            }
            (DraftNode::Number(node), JsonSchema::Number(target)) => {
                let mut current = node.schema(View::Draft);
                current.default = target.default.clone();
                current == *target
            }
            (DraftNode::Boolean(node), JsonSchema::Boolean(target)) => {
                let mut current = node.schema(View::Draft);
                current.default = target.default;
                current == *target
            }
            (DraftNode::Ref(node), JsonSchema::Ref(_)) => node.get_schema() == *target,
            _ => false,
        };
        Ok(fits)
    }

    fn merge(&mut self, key: NodeKey, target: &JsonSchema) -> DraftResult<()> {
        match target {
            JsonSchema::Object(object) => {
                if let Some(node) = self.node_mut(key).and_then(DraftNode::as_object_mut) {
                    if *node.draft_meta() != object.meta {
                        node.set_meta(object.meta.clone());
                    }
                }
                for child in self.children_in(key, View::Draft) {
                    if !object.properties.contains_key(self.get(child)?.draft_id()) {
                        self.remove_property(key, child)?;
                    }
                }

                let mut order = Vec::with_capacity(object.properties.len());
                for (name, schema) in &object.properties {
                    let child = match self.child(key, name) {
                        Some(child) if self.fits(child, schema)? => {
                            self.merge(child, schema)?;
                            child
                        }
                        Some(child) => {
                            let new = self.insert_schema(schema);
                            self.replace_property(key, child, new)?;
                            new
                        }
                        None => {
                            let new = self.insert_schema(schema);
                            if let Some(node) = self.node_mut(new) {
                                node.set_id(name.clone());
                            }
                            self.add_property(key, new, Position::Append)?;
                            new
                        }
                    };
                    order.push(child);
                }

                if self.children_in(key, View::Draft) != order {
                    for child in order {
                        self.add_property(key, child, Position::Append)?;
                    }
                }
                Ok(())
            }
            JsonSchema::Array(array) => {
                let Some(node) = self.node_mut(key).and_then(DraftNode::as_array_mut) else {
                    return Ok(());
                };
                if *node.draft_meta() != array.meta {
                    node.set_meta(array.meta.clone());
                }
                let items = node.draft_items();
                if self.fits(items, &array.items)? {
                    self.merge(items, &array.items)
                } else {
                    let new = self.insert_schema(&array.items);
                    self.set_items(key, new)
                }
            }
            JsonSchema::String(target) => {
                if let Some(node) = self.node_mut(key).and_then(DraftNode::as_string_mut) {
                    if node.draft_default() != target.default {
                        node.set_default(target.default.clone());
                    }
                    let foreign_key = node.foreign_key_mut();
                    match target.effective_foreign_key() {
                        Some(table) if foreign_key.draft_foreign_key() != Some(table) => {
                            foreign_key.set_foreign_key(table);
                        }
                        None if foreign_key.draft_foreign_key().is_some() => {
                            foreign_key.clear_foreign_key();
                        }
                        _ => {}
                    }
                }
                Ok(())
            }
            JsonSchema::Number(target) => {
                if let Some(node) = self.node_mut(key).and_then(DraftNode::as_number_mut) {
                    if *node.draft_default() != target.default {
                        node.set_default(target.default.clone());
                    }
                }
                Ok(())
            }
            JsonSchema::Boolean(target) => {
                if let Some(node) = self.node_mut(key).and_then(DraftNode::as_boolean_mut) {
                    node.set_default(target.default);
                }
                Ok(())
            }
            JsonSchema::Ref(_) => Ok(()),
        }
    }
}

fn fixed_string_fields(schema: &JsonStringSchema) -> JsonStringSchema {
    JsonStringSchema {
        default: String::new(),
        foreign_key: None,
        reference: None,
        ..schema.clone()
    }
}

fn is_legacy(schema: &JsonStringSchema) -> bool {
    schema.reference.is_some() && schema.foreign_key.is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use revisium_schema::{JsonNumberSchema, JsonObjectSchema, JsonPatch, JsonPointer};
    use revisium_test_utils::{
        array_schema, foreign_key_schema, number_schema, object_schema, post_schema, string_schema,
    };

    fn post_with(edit: impl FnOnce(&mut JsonObjectSchema)) -> JsonSchema {
        let JsonSchema::Object(mut object) = post_schema() else {
            unreachable!()
        };
        edit(&mut object);
        object.required = object.properties.keys().cloned().collect();
        object.required.sort();
        object.into()
    }

    #[test]
    fn unchanged_target_stays_clean() {
        let mut store = RootNodeStore::from_schema(&post_schema());
        store.stage_schema(&post_schema()).unwrap();
        assert!(!store.is_dirty());
        assert!(store.get_patches().is_empty());
    }

    #[test]
    fn default_change_is_merged_in_place() {
        let mut store = RootNodeStore::from_schema(&post_schema());
        let target = post_with(|object| {
            object.properties["views"] = JsonNumberSchema::new().with_default(3).into();
        });
        let views = store.child(store.root(), "views").unwrap();

        store.stage_schema(&target).unwrap();
        assert_eq!(store.child(store.root(), "views"), Some(views));
        assert_eq!(store.get_schema(), target);
        assert_eq!(
            store.get_patches(),
            vec![JsonPatch::replace(
                "/properties/views".parse().unwrap(),
                JsonNumberSchema::new().with_default(3).into()
            )]
        );
    }

    #[test]
    fn kind_change_replaces_property() {
        let mut store = RootNodeStore::from_schema(&post_schema());
        let target = post_with(|object| {
            object.properties["title"] = number_schema();
        });

        store.stage_schema(&target).unwrap();
        assert_eq!(store.get_schema(), target);
        assert_eq!(
            store.get_patches(),
            vec![JsonPatch::replace(
                "/properties/title".parse().unwrap(),
                number_schema()
            )]
        );
    }

    #[test]
    fn added_and_removed_properties() {
        let mut store = RootNodeStore::from_schema(&post_schema());
        let target = post_with(|object| {
            object.properties.shift_remove("tags");
            object
                .properties
                .insert("editor".to_string(), foreign_key_schema("User"));
        });

        store.stage_schema(&target).unwrap();
        assert_eq!(store.get_schema(), target);
        assert_eq!(
            store.get_patches(),
            vec![
                JsonPatch::remove("/properties/tags".parse().unwrap()),
                JsonPatch::add(
                    "/properties/editor".parse().unwrap(),
                    foreign_key_schema("User")
                ),
            ]
        );
    }

    #[test]
    fn foreign_key_and_items_merge() {
        let mut store = RootNodeStore::from_schema(&post_schema());
        let target = post_with(|object| {
            object.properties["author"] = string_schema();
            object.properties["tags"] = array_schema(number_schema());
        });

        store.stage_schema(&target).unwrap();
        assert_eq!(store.get_schema(), target);

        let paths: Vec<String> = store
            .get_patches()
            .iter()
            .map(|patch| patch.path().to_string())
            .collect();
        assert_eq!(paths, ["/properties/author", "/properties/tags/items"]);
    }

    #[test]
    fn root_kind_change_replaces_everything() {
        let mut store = RootNodeStore::from_schema(&post_schema());
        store.stage_schema(&string_schema()).unwrap();
        assert_eq!(
            store.get_patches(),
            vec![JsonPatch::replace(JsonPointer::root(), string_schema())]
        );

        store.reset_changes();
        assert_eq!(store.get_schema(), post_schema());
    }

    #[test]
    fn reorder_follows_target() {
        let schema = object_schema([("a", string_schema()), ("b", number_schema())]);
        let mut store = RootNodeStore::from_schema(&schema);
        let JsonSchema::Object(mut target) = schema.clone() else {
            unreachable!()
        };
        target.properties.reverse();

        store.stage_schema(&target.clone().into()).unwrap();
        let root = store.root();
        let names: Vec<&str> = store
            .children_in(root, View::Draft)
            .into_iter()
            .map(|key| store.node(key).unwrap().draft_id())
            .collect();
        assert_eq!(names, ["b", "a"]);
        assert!(store.get_patches().is_empty());
    }

    #[test]
    fn annotation_changes_are_staged() {
        let mut store = RootNodeStore::from_schema(&post_schema());
        let mut target = post_with(|object| {
            object.meta.title = Some("Post".to_string());
            if let JsonSchema::Array(tags) = &mut object.properties["tags"] {
                tags.meta.deprecated = Some(true);
            }
        });

        store.stage_schema(&target).unwrap();
        assert_eq!(store.get_schema(), target);
        let patches = store.get_patches();
        assert_eq!(
            patches,
            vec![JsonPatch::replace(JsonPointer::root(), target.clone())]
        );

        store.submit_changes();
        target.meta_mut().title = None;
        store.stage_schema(&target).unwrap();
        assert_eq!(store.get_schema(), target);
        assert_eq!(store.get_patches().len(), 1);
    }
}
