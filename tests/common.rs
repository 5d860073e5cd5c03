//! Common test utilities for building configuration and step payloads.
use kata::prelude::*;
use serde_json::{Value, json};

/// A configuration with one API call: a JSON header with a default, an
/// `api_key` query param, and a body with a required `age` plus a list of
/// order lines.
#[allow(dead_code)]
pub fn create_order_config() -> Value {
    json!({
        "steps": [{
            "apis": [{
                "domain": "https://shop.example.com",
                "path": "/orders",
                "method": "POST",
                "headers": [
                    {"key": "Content-Type", "value": "application/json"}
                ],
                "queryParams": [
                    {"key": "api_key", "dataType": "String"}
                ],
                "body": [
                    {"key": "age", "dataType": "Int"},
                    {"key": "vip", "value": "false"},
                    {"key": "lines", "values": [
                        [
                            {"key": "sku", "dataType": "String"},
                            {"key": "qty", "dataType": "Int", "value": 1}
                        ]
                    ]}
                ],
                "expectedResponse": {"status": 201}
            }]
        }]
    })
}

/// The spec built from [`create_order_config`].
#[allow(dead_code)]
pub fn create_order_spec() -> FormatData {
    SpecBuilder::new()
        .build(&create_order_config())
        .expect("valid config")
        .expect("config has an api")
}

/// Wraps entries as the first input param of the first step.
#[allow(dead_code)]
pub fn create_step(method: &str, params: Value) -> Value {
    json!([{
        "name": "step-1",
        "inputParam": [{"method": method, "params": params}]
    }])
}

/// The spec used by the end-to-end scenario: JSON content type default and an
/// integer `age` body field.
#[allow(dead_code)]
pub fn create_scenario_spec() -> FormatData {
    FormatData::from_value(&json!({
        "method": "POST",
        "headers": {"Content-Type": {"dataType": "String", "value": "application/json"}},
        "body": {"age": {"dataType": "Int"}}
    }))
    .expect("valid spec")
}
