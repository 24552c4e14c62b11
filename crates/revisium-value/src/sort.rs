//! Priority ordering of object fields

use std::cmp::Ordering;

use revisium_schema::SchemaType;
use serde_json::{Map, Value};

use crate::store::ValueStore;

/// Total order over object entries for display and export
///
/// Non-deprecated fields come first, then primitives, then plain objects
/// (not backed by a `$ref`); remaining ties are broken by key.
#[must_use]
pub fn priority_sort_comparator(a: (&str, ValueStore<'_>), b: (&str, ValueStore<'_>)) -> Ordering {
    rank(a.1)
        .cmp(&rank(b.1))
        .then_with(|| locale_compare(a.0, b.0))
}

fn rank(store: ValueStore<'_>) -> (bool, bool, bool) {
    let schema = store.schema();
    let plain_object = schema.schema_type() == SchemaType::Object && schema.reference().is_none();
    (schema.is_deprecated(), !schema.is_primitive(), !plain_object)
}

/// Case-insensitive order, lowercase before uppercase on ties
fn locale_compare(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| b.cmp(a))
}

/// Current value with object keys in priority order at every level
///
/// Arrays keep their item order.
#[must_use]
pub fn to_sorted_json_value(store: ValueStore<'_>) -> Value {
    match store.schema_type() {
        SchemaType::Object => {
            let mut entries = store.children();
            entries.sort_by(|a, b| priority_sort_comparator(*a, *b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(name, child)| (name.to_string(), to_sorted_json_value(child)))
                    .collect::<Map<_, _>>(),
            )
        }
        SchemaType::Array => {
            Value::Array(store.items().into_iter().map(to_sorted_json_value).collect())
        }
        SchemaType::String | SchemaType::Number | SchemaType::Boolean => store.get_plain_value(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ValueTree;
    use revisium_schema::{
        create_schema_store, JsonBooleanSchema, JsonObjectSchema, JsonRefSchema,
        JsonStringSchema, RefTable, SchemaMeta,
    };
    use revisium_test_utils::{array_schema, build, number_schema, object_schema, string_schema};
    use serde_json::json;

    #[test]
    fn primitives_before_composites() {
        let schema = build(&object_schema([
            ("list", array_schema(string_schema())),
            ("nested", object_schema([("x", number_schema())])),
            ("zeta", string_schema()),
            ("Alpha", number_schema()),
        ]));
        let tree = ValueTree::new(schema);
        let sorted = tree.root_store().to_sorted_json_value();

        let keys: Vec<&String> = sorted.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["Alpha", "zeta", "nested", "list"]);
    }

    #[test]
    fn deprecated_fields_last() {
        let mut old = JsonStringSchema::new();
        old.meta = SchemaMeta {
            deprecated: Some(true),
            ..SchemaMeta::default()
        };
        let schema = build(
            &JsonObjectSchema::new()
                .with_property("old", old)
                .with_property("nested", JsonObjectSchema::new())
                .with_property("flag", JsonBooleanSchema::new())
                .into(),
        );
        let tree = ValueTree::new(schema);
        let sorted = tree.root_store().to_sorted_json_value();

        let keys: Vec<&String> = sorted.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["flag", "nested", "old"]);
    }

    #[test]
    fn ref_objects_after_plain_objects() {
        let schema = create_schema_store(
            &JsonObjectSchema::new()
                .with_property(
                    "avatar",
                    JsonRefSchema::new(revisium_schema::system::FILE),
                )
                .with_property("zz", JsonObjectSchema::new())
                .into(),
            &RefTable::new(),
        )
        .unwrap();
        let tree = ValueTree::new(schema);
        let sorted = tree.root_store().to_sorted_json_value();

        let keys: Vec<&String> = sorted.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["zz", "avatar"]);
    }

    #[test]
    fn nested_objects_sorted_arrays_kept() {
        let schema = build(&object_schema([(
            "rows",
            array_schema(object_schema([("b", string_schema()), ("a", string_schema())])),
        )]));
        let tree = ValueTree::from_value(
            schema,
            &json!({ "rows": [{ "b": "2", "a": "1" }, { "b": "4", "a": "3" }] }),
        );
        let sorted = tree.root_store().to_sorted_json_value();

        assert_eq!(sorted["rows"][1], json!({ "a": "3", "b": "4" }));
        let first: Vec<&String> = sorted["rows"][0].as_object().unwrap().keys().collect();
        assert_eq!(first, ["a", "b"]);
    }

    #[test]
    fn locale_compare_folds_case() {
        assert_eq!(locale_compare("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_compare("a", "A"), Ordering::Less);
        assert_eq!(locale_compare("same", "same"), Ordering::Equal);
    }
}
