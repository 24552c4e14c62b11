use proptest::prelude::*;
use revisium_schema::{
    create_schema_store, JsonArraySchema, JsonBooleanSchema, JsonNumberSchema, JsonObjectSchema,
    JsonRefSchema, JsonSchema, JsonStringSchema, PlainSchemaOptions, RefTable, SchemaError,
};
use serde_json::json;

fn leaf() -> impl Strategy<Value = JsonSchema> {
    prop_oneof![
        ("[a-z]{0,6}", proptest::option::of("[A-Z][a-z]{2,6}")).prop_map(|(default, fk)| {
            let mut schema = JsonStringSchema::new().with_default(default);
            schema.foreign_key = fk;
            JsonSchema::from(schema)
        }),
        (any::<i32>(), any::<bool>()).prop_map(|(default, read_only)| {
            JsonNumberSchema::new()
                .with_default(default)
                .with_read_only(read_only)
                .into()
        }),
        any::<bool>().prop_map(|default| JsonBooleanSchema::new().with_default(default).into()),
    ]
}

fn schema() -> impl Strategy<Value = JsonSchema> {
    leaf().prop_recursive(4, 24, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(|items| JsonArraySchema::new(items).into()),
            proptest::collection::btree_map("[a-z]{1,5}", inner, 0..4).prop_map(|props| {
                let mut object = JsonObjectSchema::new();
                for (name, child) in props {
                    object = object.with_property(name, child);
                }
                object.required.sort();
                object.into()
            }),
        ]
    })
}

proptest! {
    #[test]
    fn plain_schema_round_trips(schema in schema()) {
        let node = create_schema_store(&schema, &RefTable::new()).unwrap();
        prop_assert_eq!(node.get_plain_schema(PlainSchemaOptions::default()), schema);
    }

    #[test]
    fn wire_json_round_trips(schema in schema()) {
        let parsed = JsonSchema::from_value(schema.to_value()).unwrap();
        prop_assert_eq!(parsed, schema);
    }
}

#[test]
fn required_emitted_sorted() {
    let schema = JsonSchema::from_value(json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["zeta", "alpha"],
        "properties": {
            "zeta": { "type": "boolean", "default": false },
            "alpha": { "type": "boolean", "default": true }
        }
    }))
    .unwrap();

    let node = create_schema_store(&schema, &RefTable::new()).unwrap();
    let plain = node.get_plain_schema(PlainSchemaOptions::default()).to_value();
    assert_eq!(plain["required"], json!(["alpha", "zeta"]));
}

#[test]
fn ref_site_survives_round_trip() {
    let mut refs = RefTable::new();
    refs.insert("urn:money", JsonNumberSchema::new().into());
    let schema: JsonSchema = JsonObjectSchema::new()
        .with_property("price", JsonRefSchema::new("urn:money"))
        .into();

    let node = create_schema_store(&schema, &refs).unwrap();
    assert_eq!(node.get_plain_schema(PlainSchemaOptions::default()), schema);

    let resolved = node
        .get_plain_schema(PlainSchemaOptions { skip_ref: true })
        .to_value();
    assert_eq!(resolved["properties"]["price"]["type"], json!("number"));
}

#[test]
fn nested_undefined_ref_fails() {
    let schema: JsonSchema = JsonArraySchema::new(JsonRefSchema::new("urn:nope")).into();
    let err = create_schema_store(&schema, &RefTable::new()).unwrap_err();
    assert!(matches!(err, SchemaError::UndefinedRef(_)));
    assert!(err.to_string().contains("Schema refs must be defined"));
}
