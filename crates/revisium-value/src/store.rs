//! Read-only views over value tree nodes

use std::sync::Arc;

use revisium_schema::{JsonPointer, SchemaNode, SchemaType};
use serde_json::{Map, Number, Value};

use crate::path;
use crate::tree::{ValueId, ValueKind, ValueNode, ValueTree};

/// Borrowed view of one value node
///
/// Cheap to copy; every query is derived on demand from the tree.
#[derive(Debug, Clone, Copy)]
pub struct ValueStore<'a> {
    tree: &'a ValueTree,
    id: ValueId,
}

impl<'a> ValueStore<'a> {
    pub(crate) fn new(tree: &'a ValueTree, id: ValueId) -> Self {
        Self { tree, id }
    }

    fn at(self, id: ValueId) -> Self {
        Self::new(self.tree, id)
    }

    fn node(self) -> &'a ValueNode {
        self.tree.node(self.id)
    }

    /// Handle for mutations on the owning tree
    #[inline]
    #[must_use]
    pub fn handle(self) -> ValueId {
        self.id
    }

    /// Owning tree
    #[inline]
    #[must_use]
    pub fn tree(self) -> &'a ValueTree {
        self.tree
    }

    /// Bound schema node
    #[inline]
    #[must_use]
    pub fn schema(self) -> &'a Arc<SchemaNode> {
        &self.node().schema
    }

    /// Schema type
    #[inline]
    #[must_use]
    pub fn schema_type(self) -> SchemaType {
        self.schema().schema_type()
    }

    /// Parent view, `None` at the root
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        self.node().parent.map(|parent| self.at(parent))
    }

    /// Property name, or array position derived from the live items
    ///
    /// Empty at the root and for detached items.
    #[must_use]
    pub fn id(self) -> String {
        if let Some(key) = &self.node().key {
            return key.clone();
        }
        self.position().map(|index| index.to_string()).unwrap_or_default()
    }

    /// Position in the parent array's current items
    #[must_use]
    pub fn position(self) -> Option<usize> {
        let parent = self.parent()?;
        match &parent.node().kind {
            ValueKind::Array { value, .. } => value.iter().position(|item| *item == self.id),
            _ => None,
        }
    }

    /// Differs from the last persisted value
    ///
    /// Composites are touched when any descendant is. Arrays are also
    /// touched once their items were structurally edited.
    #[must_use]
    pub fn touched(self) -> bool {
        match &self.node().kind {
            ValueKind::String(state) => state.value != state.base,
            ValueKind::Number(state) => !numbers_equal(&state.value, &state.base),
            ValueKind::Boolean(state) => state.value != state.base,
            ValueKind::Object(children) => children.values().any(|child| self.at(*child).touched()),
            ValueKind::Array { base, value, .. } => {
                !Arc::ptr_eq(base, value) || value.iter().any(|item| self.at(*item).touched())
            }
        }
    }

    /// Primitives are valid; composites are valid when every child is
    ///
    /// With [`ValueConfig::foreign_keys_required`](crate::ValueConfig) an
    /// empty foreign-key string makes its parent invalid.
    #[must_use]
    pub fn is_valid(self) -> bool {
        match &self.node().kind {
            ValueKind::String(_) | ValueKind::Number(_) | ValueKind::Boolean(_) => true,
            ValueKind::Object(children) => {
                children.values().all(|child| self.at(*child).is_valid_child())
            }
            ValueKind::Array { value, .. } => value.iter().all(|item| self.at(*item).is_valid_child()),
        }
    }

    fn is_valid_child(self) -> bool {
        self.is_valid() && !self.is_empty_foreign_key()
    }

    pub(crate) fn is_empty_foreign_key(self) -> bool {
        self.tree.config().foreign_keys_required
            && self.schema().foreign_key().is_some()
            && self.as_str().is_some_and(str::is_empty)
    }

    /// Current value as plain JSON, object keys in schema order
    #[must_use]
    pub fn get_plain_value(self) -> Value {
        match &self.node().kind {
            ValueKind::String(state) => Value::String(state.value.clone()),
            ValueKind::Number(state) => Value::Number(state.value.clone()),
            ValueKind::Boolean(state) => Value::Bool(state.value),
            ValueKind::Object(children) => Value::Object(
                children
                    .iter()
                    .map(|(name, child)| (name.clone(), self.at(*child).get_plain_value()))
                    .collect::<Map<_, _>>(),
            ),
            ValueKind::Array { value, .. } => {
                Value::Array(value.iter().map(|item| self.at(*item).get_plain_value()).collect())
            }
        }
    }

    /// Last persisted value as plain JSON
    #[must_use]
    pub fn base_value(self) -> Value {
        match &self.node().kind {
            ValueKind::String(state) => Value::String(state.base.clone()),
            ValueKind::Number(state) => Value::Number(state.base.clone()),
            ValueKind::Boolean(state) => Value::Bool(state.base),
            ValueKind::Object(children) => Value::Object(
                children
                    .iter()
                    .map(|(name, child)| (name.clone(), self.at(*child).base_value()))
                    .collect::<Map<_, _>>(),
            ),
            ValueKind::Array { base, .. } => {
                Value::Array(base.iter().map(|item| self.at(*item).base_value()).collect())
            }
        }
    }

    /// Current value with object keys in priority order
    #[must_use]
    pub fn to_sorted_json_value(self) -> Value {
        crate::sort::to_sorted_json_value(self)
    }

    /// Dotted path from the root, e.g. `a[0].b`
    #[must_use]
    pub fn compute_value_path(self) -> String {
        path::compute_value_path(self)
    }

    /// RFC 6901 pointer from the root, e.g. `/a/0/b`
    #[must_use]
    pub fn json_pointer(self) -> JsonPointer {
        path::json_pointer(self)
    }

    /// Object property
    #[must_use]
    pub fn child(self, name: &str) -> Option<Self> {
        match &self.node().kind {
            ValueKind::Object(children) => children.get(name).map(|child| self.at(*child)),
            _ => None,
        }
    }

    /// Object properties in schema order
    #[must_use]
    pub fn children(self) -> Vec<(&'a str, Self)> {
        match &self.node().kind {
            ValueKind::Object(children) => children
                .iter()
                .map(|(name, child)| (name.as_str(), self.at(*child)))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Current array item
    #[must_use]
    pub fn item(self, index: usize) -> Option<Self> {
        match &self.node().kind {
            ValueKind::Array { value, .. } => value.get(index).map(|item| self.at(*item)),
            _ => None,
        }
    }

    /// Current array items
    #[must_use]
    pub fn items(self) -> Vec<Self> {
        match &self.node().kind {
            ValueKind::Array { value, .. } => value.iter().map(|item| self.at(*item)).collect(),
            _ => Vec::new(),
        }
    }

    /// Number of current items or properties, zero for primitives
    #[must_use]
    pub fn len(self) -> usize {
        match &self.node().kind {
            ValueKind::Object(children) => children.len(),
            ValueKind::Array { value, .. } => value.len(),
            _ => 0,
        }
    }

    /// No items or properties
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Number of persisted array items
    #[must_use]
    pub fn base_len(self) -> usize {
        match &self.node().kind {
            ValueKind::Array { base, .. } => base.len(),
            _ => 0,
        }
    }

    /// Array items still alias the persisted storage
    #[must_use]
    pub fn shares_base_items(self) -> bool {
        match &self.node().kind {
            ValueKind::Array { base, value, .. } => Arc::ptr_eq(base, value),
            _ => false,
        }
    }

    /// Current string value
    #[must_use]
    pub fn as_str(self) -> Option<&'a str> {
        match &self.node().kind {
            ValueKind::String(state) => Some(&state.value),
            _ => None,
        }
    }

    /// Current number value
    #[must_use]
    pub fn as_number(self) -> Option<&'a Number> {
        match &self.node().kind {
            ValueKind::Number(state) => Some(&state.value),
            _ => None,
        }
    }

    /// Current boolean value
    #[must_use]
    pub fn as_bool(self) -> Option<bool> {
        match &self.node().kind {
            ValueKind::Boolean(state) => Some(state.value),
            _ => None,
        }
    }

    /// Schema marks the value read-only
    #[inline]
    #[must_use]
    pub fn read_only(self) -> bool {
        self.schema().is_read_only()
    }

    /// Table the value must reference
    #[inline]
    #[must_use]
    pub fn foreign_key(self) -> Option<&'a str> {
        self.schema().foreign_key()
    }

    /// Schema marks the value deprecated
    #[inline]
    #[must_use]
    pub fn is_deprecated(self) -> bool {
        self.schema().is_deprecated()
    }
}

/// Exact numeric equality; `1` and `1.0` are equal
#[allow(clippy::float_cmp)]
fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a == b;
    }
    let is_integer = |n: &Number| n.is_i64() || n.is_u64();
    if is_integer(a) && is_integer(b) {
        // One negative, one above `i64::MAX`
        return false;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use revisium_test_utils::{
        array_schema, build, build_post, foreign_key_schema, object_schema, post_row,
        string_schema,
    };
    use serde_json::json;

    #[test]
    fn hydrate_round_trips() {
        let tree = ValueTree::from_value(build_post(), &post_row());
        assert_eq!(tree.root_store().get_plain_value(), post_row());
        assert!(!tree.root_store().touched());
    }

    #[test]
    fn touched_propagates_and_clears() {
        let schema = build(&object_schema([("a", string_schema()), ("b", string_schema())]));
        let mut tree = ValueTree::from_value(schema, &json!({ "a": "1", "b": "2" }));
        let a = tree.root_store().child("a").unwrap().handle();
        let b = tree.root_store().child("b").unwrap().handle();

        tree.set_string(a, "changed").unwrap();
        assert!(tree.store(a).unwrap().touched());
        assert!(tree.root_store().touched());

        tree.set_string(b, "changed").unwrap();
        tree.set_string(a, "1").unwrap();
        tree.set_string(b, "2").unwrap();
        assert!(!tree.root_store().touched());
    }

    #[test]
    fn foreign_key_validity() {
        let schema = build(&object_schema([("userId", foreign_key_schema("User"))]));
        let mut tree = ValueTree::from_value(schema, &json!({ "userId": "" }));
        let root = tree.root();
        assert!(!tree.root_store().is_valid());
        assert!(tree.root_store().child("userId").unwrap().is_valid());

        tree.update_base_value(root, &json!({ "userId": "user-1" })).unwrap();
        assert!(tree.root_store().is_valid());
    }

    #[test]
    fn array_of_objects_validity() {
        let item = revisium_schema::JsonObjectSchema::new().with_property(
            "userId",
            revisium_schema::JsonStringSchema::new().with_reference("User"),
        );
        let schema = build(&array_schema(item.into()));
        let mut tree = ValueTree::from_value(schema, &json!([{ "userId": "" }]));
        let root = tree.root();
        assert!(!tree.root_store().is_valid());

        tree.update_base_value(root, &json!([{ "userId": "user-1" }])).unwrap();
        assert!(tree.root_store().is_valid());
    }

    #[test]
    fn foreign_key_rule_can_be_disabled() {
        let schema = build(&object_schema([("userId", foreign_key_schema("User"))]));
        let mut tree = ValueTree::with_config(
            schema,
            crate::ValueConfig::new().with_foreign_keys_required(false),
        );
        let root = tree.root();
        tree.update_base_value(root, &json!({ "userId": "" })).unwrap();
        assert!(tree.root_store().is_valid());
    }

    #[test]
    fn item_id_follows_position() {
        let schema = build(&array_schema(string_schema()));
        let mut tree = ValueTree::from_value(schema, &json!(["a", "b", "c"]));
        let root = tree.root();
        let last = tree.root_store().item(2).unwrap().handle();
        assert_eq!(tree.store(last).unwrap().id(), "2");

        let removed = tree.remove_item(root, 0).unwrap();
        assert_eq!(tree.store(last).unwrap().id(), "1");
        assert_eq!(tree.store(removed).unwrap().id(), "");
    }

    #[test]
    fn numbers_compare_by_value() {
        let schema = build(&revisium_test_utils::number_schema());
        let mut tree = ValueTree::from_value(schema, &json!(1));
        let root = tree.root();
        tree.set_value(root, json!(1.0)).unwrap();
        assert!(!tree.root_store().touched());
        tree.set_number(root, 2).unwrap();
        assert!(tree.root_store().touched());
    }

    #[test]
    fn tiny_and_large_number_edits_are_touched() {
        let schema = build(&revisium_test_utils::number_schema());
        let mut tree = ValueTree::from_value(Arc::clone(&schema), &json!(0));
        let root = tree.root();
        tree.set_value(root, json!(1e-17)).unwrap();
        assert!(tree.root_store().touched());

        let mut tree = ValueTree::from_value(Arc::clone(&schema), &json!(9_007_199_254_740_992_u64));
        let root = tree.root();
        tree.set_number(root, 9_007_199_254_740_993_u64).unwrap();
        assert!(tree.root_store().touched());

        let mut tree = ValueTree::from_value(schema, &json!(-1));
        let root = tree.root();
        tree.set_number(root, u64::MAX).unwrap();
        assert!(tree.root_store().touched());
        tree.set_value(root, json!(-1.0)).unwrap();
        assert!(!tree.root_store().touched());
    }
}
