mod common;

use common::*;
use kata::prelude::*;
use kata::spec::SpecFields;
use serde_json::{Value, json};

#[test]
fn test_order_config_builds_expected_spec() {
    let spec = create_order_spec();

    assert_eq!(spec.domain.as_deref(), Some("https://shop.example.com"));
    assert_eq!(spec.path.as_deref(), Some("/orders"));
    assert_eq!(spec.method.as_deref(), Some("POST"));

    assert_eq!(
        spec.headers["Content-Type"],
        LeafSpec::with_default(DataType::String, json!("application/json"))
    );
    assert_eq!(spec.query_params["api_key"], LeafSpec::new(DataType::String));

    assert_eq!(spec.body["age"], SpecNode::Leaf(LeafSpec::new(DataType::Int)));
    assert_eq!(
        spec.body["vip"],
        SpecNode::Leaf(LeafSpec::with_default(DataType::Boolean, json!("false")))
    );

    let SpecNode::List(line) = &spec.body["lines"] else {
        panic!("lines should be a list, got {:?}", spec.body["lines"]);
    };
    let SpecNode::Object(line_fields) = line.as_ref() else {
        panic!("list element should be an object");
    };
    assert_eq!(line_fields["sku"], SpecNode::Leaf(LeafSpec::new(DataType::String)));
    assert_eq!(
        line_fields["qty"],
        SpecNode::Leaf(LeafSpec::with_default(DataType::Int, json!(1)))
    );

    assert_eq!(spec.expected_response, json!({"status": 201}));
}

#[test]
fn test_declaration_order_is_kept() {
    let spec = create_order_spec();
    let keys: Vec<&str> = spec.body.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["age", "vip", "lines"]);
}

#[test]
fn test_missing_api_yields_none() {
    let builder = SpecBuilder::new();
    assert_eq!(builder.build(&json!({})).unwrap(), None);
    assert_eq!(builder.build(&json!({"steps": []})).unwrap(), None);
    assert_eq!(builder.build(&json!({"steps": [{"apis": []}]})).unwrap(), None);
}

#[test]
fn test_minimal_api_gets_empty_sections() {
    let spec = SpecBuilder::new().build_api(&json!({"path": "/ping"})).unwrap();
    assert_eq!(spec.path.as_deref(), Some("/ping"));
    assert!(spec.method.is_none());
    assert!(!spec.has_declarations());
    assert_eq!(spec.expected_response, json!({}));
}

#[test]
fn test_data_type_hints_are_lenient() {
    let api = json!({"body": [
        {"key": "a", "dataType": "integer"},
        {"key": "b", "dataType": "double"},
        {"key": "c", "dataType": "List<String>"},
        {"key": "d", "dataType": "mystery", "value": "true"},
        {"key": "e", "value": "   "}
    ]});
    let spec = SpecBuilder::new().build_api(&api).unwrap();
    let leaf = |key: &str| spec.body[key].as_leaf().cloned().unwrap();

    assert_eq!(leaf("a").data_type, DataType::Int);
    assert_eq!(leaf("b").data_type, DataType::Float);
    assert_eq!(leaf("c").data_type, DataType::List);
    assert_eq!(leaf("d"), LeafSpec::with_default(DataType::Boolean, json!("true")));
    // Blank samples type the leaf but never become a default.
    assert_eq!(leaf("e"), LeafSpec::new(DataType::String));
}

#[test]
fn test_list_shape_comes_from_first_element() {
    let api = json!({"body": [{"key": "items", "values": [
        [{"key": "x", "dataType": "Int"}],
        [{"key": "y", "dataType": "String"}]
    ]}]});

    let spec = SpecBuilder::new().build_api(&api).unwrap();
    let mut expected = SpecFields::new();
    expected.insert("x".into(), SpecNode::Leaf(LeafSpec::new(DataType::Int)));
    assert_eq!(spec.body["items"], SpecNode::List(Box::new(SpecNode::Object(expected))));
}

#[test]
fn test_validate_rejects_heterogeneous_lists() {
    let api = json!({"body": [{"key": "items", "values": [
        [{"key": "x", "value": 1}],
        [{"key": "x", "value": 2}],
        [{"key": "x", "value": 3}, {"key": "z", "value": 4}]
    ]}]});

    let err = SpecBuilder::new()
        .with_list_shape(ListShapePolicy::Validate)
        .build_api(&api)
        .unwrap_err();
    assert_eq!(
        err,
        SpecBuildError::HeterogeneousList {
            field: "items".to_string(),
            index: 2
        }
    );
    assert!(err.to_string().contains("'items'"));
}

#[test]
fn test_validate_accepts_reordered_rows() {
    let api = json!({"body": [{"key": "items", "values": [
        [{"key": "x", "value": 1}, {"key": "y", "value": 2}],
        [{"key": "y", "value": 3}, {"key": "x", "value": 4}]
    ]}]});
    let result = SpecBuilder::new()
        .with_list_shape(ListShapePolicy::Validate)
        .build_api(&api);
    assert!(result.is_ok());
}

#[test]
fn test_plain_object_sections_are_inferred() {
    let api = json!({
        "headers": {"X-Trace": "abc"},
        "body": {"name": "ada", "tags": ["a", "b"], "address": {"zip": "123"}}
    });
    let spec = SpecBuilder::new().build_api(&api).unwrap();

    assert_eq!(
        spec.headers["X-Trace"],
        LeafSpec::with_default(DataType::String, json!("abc"))
    );
    assert_eq!(
        spec.body["tags"],
        SpecNode::List(Box::new(SpecNode::Leaf(LeafSpec::new(DataType::String))))
    );
    let mut address = SpecFields::new();
    address.insert(
        "zip".into(),
        SpecNode::Leaf(LeafSpec::with_default(DataType::Int, json!("123"))),
    );
    assert_eq!(spec.body["address"], SpecNode::Object(address));
}

#[test]
fn test_spec_json_round_trip() {
    let spec = create_order_spec();
    let wire = spec.to_value();
    assert_eq!(wire["body"]["lines"][0]["qty"], json!({"dataType": "Int", "value": 1}));
    assert_eq!(wire["queryParams"]["api_key"], json!({"dataType": "String"}));
    assert_eq!(FormatData::from_value(&wire).unwrap(), spec);
}

#[test]
fn test_non_string_data_type_is_rejected() {
    let err = FormatData::from_value(&json!({"body": {"age": {"dataType": 5}}})).unwrap_err();
    assert!(matches!(err, SpecBuildError::InvalidShape(_)));
}

#[test]
fn test_artifact_preserves_spec() {
    let spec = create_order_spec();
    let bytes = SpecArtifact::from_spec(&spec).unwrap().to_bytes().unwrap();
    let restored = SpecArtifact::from_bytes(&bytes).unwrap().into_spec().unwrap();
    assert_eq!(restored, spec);
}

#[test]
fn test_artifact_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orders.bin");
    let spec = create_order_spec();

    SpecArtifact::from_spec(&spec).unwrap().save(&path).unwrap();
    let loaded = SpecArtifact::from_file(&path).unwrap().into_spec().unwrap();
    assert_eq!(loaded.body, spec.body);
    assert_eq!(loaded.expected_response, spec.expected_response);
}

#[test]
fn test_artifact_rejects_garbage_and_missing_files() {
    assert!(matches!(
        SpecArtifact::from_bytes(&[0xff, 0xff, 0xff]),
        Err(ArtifactError::Decode(_))
    ));

    let dir = tempfile::tempdir().unwrap();
    let err = SpecArtifact::from_file(dir.path().join("missing.bin")).unwrap_err();
    assert!(matches!(err, ArtifactError::Io { .. }));
    assert!(err.to_string().contains("missing.bin"));
}

#[test]
fn test_artifact_rejects_other_versions() {
    let spec = FormatData::default();
    let mut bytes = SpecArtifact::from_spec(&spec).unwrap().to_bytes().unwrap();
    // The version is the first field and encodes as a single varint byte.
    bytes[0] = 9;
    let err = SpecArtifact::from_bytes(&bytes).unwrap_err();
    assert!(err.to_string().contains("unsupported artifact version 9"));
}

#[test]
fn test_expected_response_null_defaults_to_empty_object() {
    let spec = SpecBuilder::new()
        .build_api(&json!({"expectedResponse": null}))
        .unwrap();
    assert_eq!(spec.expected_response, Value::Object(Default::default()));
}
