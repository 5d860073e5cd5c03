mod common;

use common::*;
use kata::prelude::*;
use serde_json::json;
use std::fs;

#[test]
fn test_engine_config_drives_the_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("engine.json");
    fs::write(
        &config_path,
        r#"{"strict": true, "knownHeaders": ["X-Tenant"], "sensitiveKeys": ["authorization", "cookie"]}"#,
    )
    .unwrap();

    let engine = EngineConfig::from_file(&config_path).unwrap();
    assert_eq!(engine.list_shape, ListShapePolicy::Lenient);

    let spec = engine.spec_builder().build(&create_order_config()).unwrap().unwrap();
    let step = create_step(
        "POST",
        json!([
            {"key": "age", "value": "30"},
            {"key": "x-tenant", "value": "acme"},
            {"key": "coupon", "value": "SAVE"}
        ]),
    );

    let outcome = engine.mapper().map(&step, Some(&spec));
    assert_eq!(outcome.format_param.body["age"], json!(30));
    // Known headers are not declared, so the strict header pass drops them again.
    assert!(!outcome.format_param.headers.contains_key("x-tenant"));
    assert_eq!(outcome.extras, vec!["headers.x-tenant", "body.coupon"]);

    let normalized = engine.filtered_normalizer().normalize(&json!([
        {"key": "Cookie", "value": "c"},
        {"key": "Authorization", "value": "a"},
        {"key": "keep", "value": 1}
    ]));
    assert_eq!(serde_json::Value::Object(normalized), json!({"keep": 1}));
}

#[test]
fn test_engine_config_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = EngineConfig::from_file(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(missing, ConfigError::Read { .. }));
    assert!(missing.to_string().contains("nope.json"));

    let bad = EngineConfig::from_json("{not json").unwrap_err();
    assert!(matches!(bad, ConfigError::Parse(_)));

    let wrong_policy = EngineConfig::from_json(r#"{"listShape": "sometimes"}"#);
    assert!(wrong_policy.is_err());
}

#[test]
fn test_validate_policy_from_config_rejects_mixed_lists() {
    let engine = EngineConfig::from_json(r#"{"listShape": "validate"}"#).unwrap();
    let config = json!({"steps": [{"apis": [{
        "body": [{"key": "rows", "values": [
            [{"key": "a", "value": 1}],
            [{"key": "b", "value": 2}]
        ]}]
    }]}]});
    let err = engine.spec_builder().build(&config).unwrap_err();
    assert_eq!(
        err.to_string(),
        "List field 'rows' has an element at index 1 whose shape differs from the first element"
    );
}

#[test]
fn test_outcome_report() {
    let spec = create_order_spec();
    let raw = json!({
        "method": "POST",
        "params": {"age": "30", "api_key": "k"},
        "body": {"lines": [{"sku": "A"}], "gift": true}
    });
    let outcome = ParamMapper::default().map_with(&raw, Some(&spec), MapOptions { strict: true });

    let report = OutcomeFormatter::format_outcome(&outcome);
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(
        lines,
        vec![
            "POST https://shop.example.com/orders",
            "headers: Content-Type=\"application/json\"",
            "query: api_key=\"k\"",
            "body: age=30, vip=false, lines=[1 item(s)]",
            "undeclared fields (1):",
            "  - body.gift",
        ]
    );
}

#[test]
fn test_outcome_report_without_extras() {
    let outcome = ParamMapper::default().map(&create_step("GET", json!([])), None);
    let report = OutcomeFormatter::format_outcome(&outcome);
    assert_eq!(
        report,
        "GET \nheaders: (none)\nquery: (none)\nbody: (none)\nno undeclared fields"
    );
}

#[test]
fn test_spec_artifact_feeds_the_mapper() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spec.bin");
    SpecArtifact::from_spec(&create_scenario_spec()).unwrap().save(&path).unwrap();

    let spec = SpecArtifact::from_file(&path).unwrap().into_spec().unwrap();
    let outcome = ParamMapper::default().map(
        &create_step("POST", json!([{"key": "age", "value": "30"}])),
        Some(&spec),
    );
    assert_eq!(outcome.format_param.body["age"], json!(30));
    assert_eq!(outcome.format_param.headers["Content-Type"], json!("application/json"));
}
