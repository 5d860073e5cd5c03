use super::EntryNormalizer;
use serde::Serialize;
use serde_json::{Map, Value};

/// One step of a test case after every entry list has been normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedStep {
    pub name: Value,
    /// Only present when the source step carries a `method` key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<Value>,
    pub headers: Option<Map<String, Value>>,
    pub query_params: Option<Map<String, Value>>,
    pub body: Option<Map<String, Value>>,
    /// `None` when the step has no input params at all.
    pub input_param: Option<Vec<NormalizedInput>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedInput {
    pub method: Value,
    pub params: Map<String, Value>,
}

/// Scans a full list of steps, normalizing every entry list with `normalizer`.
///
/// Sections that are not entry arrays come out as `None`. Anything other than
/// an array of steps yields an empty list.
pub fn normalize_steps(input: &Value, normalizer: &EntryNormalizer) -> Vec<NormalizedStep> {
    let Some(steps) = input.as_array() else {
        return Vec::new();
    };

    steps
        .iter()
        .map(|step| {
            let section = |name: &str| match step.get(name) {
                Some(entries @ Value::Array(_)) => Some(normalizer.normalize(entries)),
                _ => None,
            };

            let input_param = step
                .get("inputParam")
                .and_then(Value::as_array)
                .filter(|inputs| !inputs.is_empty())
                .map(|inputs| {
                    inputs
                        .iter()
                        .map(|input| NormalizedInput {
                            method: input.get("method").cloned().unwrap_or(Value::Null),
                            params: match input.get("params") {
                                Some(entries @ Value::Array(_)) => normalizer.normalize(entries),
                                _ => Map::new(),
                            },
                        })
                        .collect()
                });

            NormalizedStep {
                name: step.get("name").cloned().unwrap_or(Value::Null),
                method: step.get("method").cloned(),
                headers: section("headers"),
                query_params: section("queryParams"),
                body: section("body"),
                input_param,
            }
        })
        .collect()
}
