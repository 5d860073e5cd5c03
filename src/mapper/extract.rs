use crate::entry::{EntryNormalizer, entry_key};
use serde_json::{Map, Value};

/// The parts of a raw step payload the mapper works from.
#[derive(Debug, Default)]
pub(super) struct Extracted {
    pub method: Option<String>,
    pub params: Map<String, Value>,
    /// Secondary `body` entry array on the first step.
    pub extra_body: Map<String, Value>,
    /// Already-shaped sections of an object-form input, merged as-is.
    pub headers: Map<String, Value>,
    pub query_params: Map<String, Value>,
    pub body: Map<String, Value>,
}

/// Picks the request out of either a list of steps (first step, first input
/// param) or an already-shaped object.
pub(super) fn extract(raw: &Value, normalizer: &EntryNormalizer) -> Extracted {
    match raw {
        Value::Array(steps) => {
            let Some(step) = steps.first() else {
                return Extracted::default();
            };
            let input = step.pointer("/inputParam/0");
            Extracted {
                method: input.and_then(method_of),
                params: input
                    .and_then(|ip| ip.get("params"))
                    .map(|params| normalizer.normalize(params))
                    .unwrap_or_default(),
                extra_body: match step.get("body") {
                    Some(Value::Array(entries)) => body_entries_to_params(entries),
                    _ => Map::new(),
                },
                ..Extracted::default()
            }
        }
        Value::Object(_) => {
            let section = |name: &str| {
                raw.get(name)
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default()
            };
            Extracted {
                method: method_of(raw),
                params: raw
                    .get("params")
                    .map(|params| normalizer.normalize(params))
                    .unwrap_or_default(),
                extra_body: Map::new(),
                headers: section("headers"),
                query_params: section("queryParams"),
                body: section("body"),
            }
        }
        _ => Extracted::default(),
    }
}

fn method_of(source: &Value) -> Option<String> {
    source
        .get("method")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Converts the secondary body encoding: `values` rows become objects and
/// every missing leaf becomes `""`.
fn body_entries_to_params(entries: &[Value]) -> Map<String, Value> {
    let mut out = Map::new();
    for entry in entries {
        let Some(key) = entry_key(entry) else {
            continue;
        };
        let value = match entry.get("values") {
            Some(Value::Array(rows)) => Value::Array(
                rows.iter()
                    .map(|row| match row {
                        Value::Array(cells) => Value::Object(
                            cells
                                .iter()
                                .filter_map(|cell| {
                                    Some((entry_key(cell)?.to_string(), blank_if_nil(cell)))
                                })
                                .collect(),
                        ),
                        Value::Object(obj) if obj.contains_key("key") => {
                            let mut single = Map::new();
                            if let Some(k) = entry_key(row) {
                                single.insert(k.to_string(), blank_if_nil(row));
                            }
                            Value::Object(single)
                        }
                        other => other.clone(),
                    })
                    .collect(),
            ),
            _ => blank_if_nil(entry),
        };
        out.insert(key.to_string(), value);
    }
    out
}

fn blank_if_nil(entry: &Value) -> Value {
    match entry.get("value") {
        None | Some(Value::Null) => Value::String(String::new()),
        Some(value) => value.clone(),
    }
}
