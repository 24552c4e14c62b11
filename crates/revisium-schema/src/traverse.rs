//! Depth-first schema traversal

use crate::node::{SchemaNode, SchemaNodeKind};
use crate::pointer::JsonPointer;

/// Visitor decision for [`traverse_with_skip`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Traversal {
    /// Descend into the node's children
    #[default]
    Continue,
    /// Do not descend below this node; siblings are still visited
    Skip,
}

/// Pre-order visit of every node
///
/// Object properties are visited in insertion order, array items after
/// their array. `visit` receives each node with its schema pointer.
pub fn traverse_schema<F>(node: &SchemaNode, mut visit: F)
where
    F: FnMut(&SchemaNode, &JsonPointer),
{
    traverse_with_skip(node, |node, pointer| {
        visit(node, pointer);
        Traversal::Continue
    });
}

/// Pre-order visit that lets `visit` prune subtrees
pub fn traverse_with_skip<F>(node: &SchemaNode, mut visit: F)
where
    F: FnMut(&SchemaNode, &JsonPointer) -> Traversal,
{
    walk(node, &JsonPointer::root(), &mut visit);
}

fn walk<F>(node: &SchemaNode, pointer: &JsonPointer, visit: &mut F)
where
    F: FnMut(&SchemaNode, &JsonPointer) -> Traversal,
{
    if visit(node, pointer) == Traversal::Skip {
        return;
    }

    match node.kind() {
        SchemaNodeKind::Object(object) => {
            for (name, child) in object.properties() {
                walk(child, &pointer.property(name), visit);
            }
        }
        SchemaNodeKind::Array(array) => walk(array.items(), &pointer.items(), visit),
        SchemaNodeKind::String(_) | SchemaNodeKind::Number(_) | SchemaNodeKind::Boolean(_) => {}
    }
}

/// Distinct foreign-key tables referenced anywhere below `node`
#[must_use]
pub fn collect_foreign_keys(node: &SchemaNode) -> Vec<String> {
    let mut tables: Vec<String> = Vec::new();
    traverse_schema(node, |node, _| {
        if let Some(table) = node.foreign_key() {
            if !tables.iter().any(|known| known == table) {
                tables.push(table.to_string());
            }
        }
    });
    tables
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::create_schema_store;
    use crate::json_schema::{JsonSchema, SchemaType};
    use crate::refs::RefTable;
    use serde_json::json;
    use std::sync::Arc;

    fn sample() -> Arc<SchemaNode> {
        let schema = JsonSchema::from_value(json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["author", "comments", "title"],
            "properties": {
                "title": { "type": "string", "default": "" },
                "author": { "type": "string", "default": "", "foreignKey": "User" },
                "comments": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "additionalProperties": false,
                        "required": ["by", "text"],
                        "properties": {
                            "text": { "type": "string", "default": "" },
                            "by": { "type": "string", "default": "", "reference": "User" }
                        }
                    }
                }
            }
        }))
        .unwrap();
        create_schema_store(&schema, &RefTable::new()).unwrap()
    }

    #[test]
    fn traverse_visits_pre_order() {
        let mut visited = Vec::new();
        traverse_schema(&sample(), |_, pointer| visited.push(pointer.to_string()));

        assert_eq!(
            visited,
            vec![
                "",
                "/properties/title",
                "/properties/author",
                "/properties/comments",
                "/properties/comments/items",
                "/properties/comments/items/properties/text",
                "/properties/comments/items/properties/by",
            ]
        );
    }

    #[test]
    fn skip_prunes_only_subtree() {
        let mut visited = Vec::new();
        traverse_with_skip(&sample(), |node, pointer| {
            visited.push(pointer.to_string());
            if node.schema_type() == SchemaType::Array {
                Traversal::Skip
            } else {
                Traversal::Continue
            }
        });

        assert_eq!(visited.len(), 4);
        assert!(visited.contains(&"/properties/comments".to_string()));
        assert!(!visited.iter().any(|p| p.contains("items")));
    }

    #[test]
    fn foreign_keys_deduplicated() {
        assert_eq!(collect_foreign_keys(&sample()), vec!["User".to_string()]);
    }
}
