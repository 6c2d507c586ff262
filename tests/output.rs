use schemascope::OutputMode;
use serde_json::{json, Value};
use test_case::test_case;

#[test_case{
    &json!({"$id": "https://example.com/root.json", "allOf": [{"type": "string"}, {"maxLength": 20}]}),
    &json!("some string"),
    &json!({"valid": true}); "valid allOf"
}]
#[test_case{
    &json!({"$id": "https://example.com/root.json", "allOf": [{"type": "array"}, {"maxLength": 4}]}),
    &json!("some string"),
    &json!({
        "valid": false,
        "errors": [
            {
                "keyword": "type",
                "keywordLocation": "/allOf/0/type",
                "instanceLocation": "",
                "schemaBaseUri": "https://example.com/root.json",
                "error": "\"some string\" is not of type \"array\""
            },
            {
                "keyword": "maxLength",
                "keywordLocation": "/allOf/1/maxLength",
                "instanceLocation": "",
                "schemaBaseUri": "https://example.com/root.json",
                "error": "\"some string\" is longer than 4 characters (11 given)"
            }
        ]
    }); "invalid allOf"
}]
#[test_case{
    &json!({
        "$id": "https://example.com/root.json",
        "properties": {"tags": {"items": {"type": "string"}}}
    }),
    &json!({"tags": ["a", 1]}),
    &json!({
        "valid": false,
        "errors": [
            {
                "keyword": "type",
                "keywordLocation": "/properties/tags/items/type",
                "instanceLocation": "/tags/1",
                "schemaBaseUri": "https://example.com/root.json",
                "error": "1 is not of type \"string\""
            }
        ]
    }); "nested instance location"
}]
#[test_case{
    &json!({
        "$id": "https://example.com/root.json",
        "properties": {"owner": {"$ref": "person.json"}},
        "$defs": {"person": {"$id": "person.json", "required": ["name"]}}
    }),
    &json!({"owner": {}}),
    &json!({
        "valid": false,
        "errors": [
            {
                "keyword": "required",
                "keywordLocation": "/properties/owner/$ref/required",
                "instanceLocation": "/owner",
                "schemaBaseUri": "https://example.com/person.json",
                "referencingUri": "https://example.com/person.json",
                "error": "\"name\" is a required property"
            }
        ]
    }); "through a reference"
}]
#[test_case{
    &json!({"$id": "https://example.com/root.json", "properties": {"a~b": false, "c/d": false}}),
    &json!({"a~b": 1, "c/d": 2}),
    &json!({
        "valid": false,
        "errors": [
            {
                "keyword": "properties",
                "keywordLocation": "/properties/a~0b",
                "instanceLocation": "/a~0b",
                "schemaBaseUri": "https://example.com/root.json",
                "error": "False schema does not allow 1"
            },
            {
                "keyword": "properties",
                "keywordLocation": "/properties/c~1d",
                "instanceLocation": "/c~1d",
                "schemaBaseUri": "https://example.com/root.json",
                "error": "False schema does not allow 2"
            }
        ]
    }); "escaped pointers"
}]
fn list_output(schema: &Value, instance: &Value, expected: &Value) {
    let document = schemascope::validator_for(schema).expect("Valid schema");
    let outcome = document
        .validate_value(instance, OutputMode::List)
        .expect("No faults");
    let serialized = serde_json::to_value(&outcome).expect("Outcome is serializable");
    assert_eq!(&serialized, expected);
}

#[test]
fn fail_fast_output_has_one_error() {
    let document = schemascope::compile(r#"{"$id": "https://example.com/root.json", "minimum": 5, "multipleOf": 2}"#)
        .expect("Valid schema");
    let outcome = document.validate("3", OutputMode::FailFast).expect("No faults");
    let serialized = serde_json::to_value(&outcome).expect("Outcome is serializable");
    assert_eq!(serialized["valid"], json!(false));
    assert_eq!(serialized["errors"].as_array().map(Vec::len), Some(1));
}

#[test]
fn owned_outcome_outlives_the_instance() {
    let document = schemascope::compile(r#"{"type": "integer"}"#).expect("Valid schema");
    let outcome = {
        let instance = json!("text");
        document
            .validate_value(&instance, OutputMode::List)
            .expect("No faults")
            .into_owned()
    };
    assert_eq!(outcome.errors()[0].instance.as_ref(), &json!("text"));
    assert_eq!(outcome.errors()[0].to_string(), r#""text" is not of type "integer""#);
}
