//! Value paths
//!
//! Two spellings of the same location: the dotted form shown to users
//! (`a[0].b`) and the RFC 6901 pointer (`/a/0/b`).

use revisium_schema::{JsonPointer, SchemaType};

use crate::store::ValueStore;
use crate::tree::ValueTree;

/// Dotted path from the root, `""` for the root itself
///
/// Property segments are dot-joined and array positions are bracketed,
/// so nested arrays read `a[0][1]` and array elements' fields `a[0].b`.
/// Nodes below a removed array item have no path and yield `""`.
#[must_use]
pub fn compute_value_path(store: ValueStore<'_>) -> String {
    let mut segments = Vec::new();
    let mut current = store;

    while let Some(parent) = current.parent() {
        let is_index = parent.schema_type() == SchemaType::Array;
        if is_index && current.position().is_none() {
            return String::new();
        }
        segments.push((is_index, current.id()));
        current = parent;
    }

    let mut path = String::new();
    for (is_index, segment) in segments.into_iter().rev() {
        if is_index {
            path.push('[');
            path.push_str(&segment);
            path.push(']');
        } else {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(&segment);
        }
    }
    path
}

/// RFC 6901 pointer from the root, empty below a removed array item
#[must_use]
pub fn json_pointer(store: ValueStore<'_>) -> JsonPointer {
    let mut segments = Vec::new();
    let mut current = store;

    while let Some(parent) = current.parent() {
        if parent.schema_type() == SchemaType::Array && current.position().is_none() {
            return JsonPointer::root();
        }
        segments.push(current.id());
        current = parent;
    }

    segments.reverse();
    JsonPointer::new(segments)
}

impl ValueTree {
    /// Find the value at `pointer`
    ///
    /// Array segments must be decimal positions within the current items.
    #[must_use]
    pub fn resolve(&self, pointer: &JsonPointer) -> Option<ValueStore<'_>> {
        pointer.iter().try_fold(self.root_store(), |store, segment| {
            store
                .child(segment)
                .or_else(|| segment.parse().ok().and_then(|index| store.item(index)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revisium_test_utils::{array_schema, build, object_schema, post_row, string_schema};
    use serde_json::json;

    #[test]
    fn path_through_array_of_objects() {
        let schema = build(&object_schema([(
            "a",
            array_schema(object_schema([("b", string_schema())])),
        )]));
        let tree = ValueTree::from_value(schema, &json!({ "a": [{ "b": "x" }] }));

        let b = tree.root_store().child("a").unwrap().item(0).unwrap().child("b").unwrap();
        assert_eq!(compute_value_path(b), "a[0].b");
        assert_eq!(b.json_pointer().to_string(), "/a/0/b");
    }

    #[test]
    fn path_through_nested_arrays() {
        let schema = build(&object_schema([(
            "a",
            array_schema(array_schema(string_schema())),
        )]));
        let tree = ValueTree::from_value(schema, &json!({ "a": [["x"], ["y", "z"]] }));

        let z = tree.root_store().child("a").unwrap().item(1).unwrap().item(1).unwrap();
        assert_eq!(z.compute_value_path(), "a[1][1]");
    }

    #[test]
    fn root_paths_are_empty() {
        let schema = build(&array_schema(string_schema()));
        let tree = ValueTree::from_value(schema, &json!(["x"]));
        assert_eq!(tree.root_store().compute_value_path(), "");
        assert!(tree.root_store().json_pointer().is_empty());
        assert_eq!(tree.root_store().item(0).unwrap().compute_value_path(), "[0]");
    }

    #[test]
    fn resolve_pointer() {
        let tree = ValueTree::from_value(revisium_test_utils::build_post(), &post_row());
        let pointer: JsonPointer = "/comments/1/by".parse().unwrap();
        let by = tree.resolve(&pointer).unwrap();
        assert_eq!(by.as_str(), Some("carol"));
        assert_eq!(by.json_pointer(), pointer);

        assert!(tree.resolve(&"/comments/7".parse().unwrap()).is_none());
        assert!(tree.resolve(&"/missing".parse().unwrap()).is_none());
    }

    #[test]
    fn removed_items_have_no_path() {
        let schema = build(&object_schema([(
            "tags",
            array_schema(object_schema([("b", string_schema())])),
        )]));
        let mut tree = ValueTree::from_value(schema, &json!({ "tags": [{ "b": "x" }, { "b": "y" }] }));
        let tags = tree.root_store().child("tags").unwrap().handle();
        let removed = tree.remove_item(tags, 0).unwrap();

        let item = tree.store(removed).unwrap();
        assert_eq!(item.compute_value_path(), "");
        assert_eq!(item.child("b").unwrap().compute_value_path(), "");
        assert!(item.json_pointer().is_empty());

        let kept = tree.root_store().child("tags").unwrap().item(0).unwrap();
        assert_eq!(kept.child("b").unwrap().compute_value_path(), "tags[0].b");
    }

    #[test]
    fn escaped_property_names() {
        let schema = build(&object_schema([("a/b", string_schema())]));
        let tree = ValueTree::new(schema);
        let child = tree.root_store().child("a/b").unwrap();
        assert_eq!(child.json_pointer().to_string(), "/a~1b");
        assert_eq!(child.compute_value_path(), "a/b");
    }
}
