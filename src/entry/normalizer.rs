use ahash::AHashSet;
use serde_json::{Map, Value};

/// How deep the normalizer descends into `values` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Depth {
    /// Row entries keep their `value` literally.
    Flat,
    /// Rows are normalized again, so nested `values` also become lists.
    Nested,
}

/// Reshapes wire-level `{key, value | values}` entry lists into a key/value tree.
///
/// The normalizer never looks at `dataType`; typing belongs to the spec builder
/// and the param mapper. A normalizer built with [`EntryNormalizer::filtered`]
/// additionally drops every entry whose key matches one of its sensitive names
/// (case-insensitively) and removes mapping elements left empty by that.
#[derive(Debug, Clone, Default)]
pub struct EntryNormalizer {
    sensitive_keys: AHashSet<String>,
}

impl EntryNormalizer {
    /// A normalizer that keeps every entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A normalizer that drops entries keyed by any of `keys`.
    pub fn filtered<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            sensitive_keys: keys
                .into_iter()
                .map(|k| k.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn is_filtering(&self) -> bool {
        !self.sensitive_keys.is_empty()
    }

    /// Normalizes an entry list. A plain object is returned unchanged; any other
    /// input yields an empty mapping.
    pub fn normalize(&self, entries: &Value) -> Map<String, Value> {
        self.normalize_at(entries, Depth::Flat)
    }

    /// Like [`normalize`](Self::normalize), but rows inside `values` are
    /// normalized recursively.
    pub fn normalize_nested(&self, entries: &Value) -> Map<String, Value> {
        self.normalize_at(entries, Depth::Nested)
    }

    fn normalize_at(&self, entries: &Value, depth: Depth) -> Map<String, Value> {
        let list = match entries {
            Value::Array(list) => list,
            Value::Object(map) => return map.clone(),
            _ => return Map::new(),
        };

        let mut out = Map::new();
        for entry in list {
            let Some(key) = self.accepted_key(entry) else {
                continue;
            };
            let value = if let Some(literal) = entry.get("value") {
                literal.clone()
            } else {
                match entry.get("values") {
                    Some(Value::Array(rows)) if !rows.is_empty() => {
                        Value::Array(self.normalize_rows(rows, depth))
                    }
                    _ => Value::Null,
                }
            };
            out.insert(key.to_string(), value);
        }
        out
    }

    fn normalize_rows(&self, rows: &[Value], depth: Depth) -> Vec<Value> {
        rows.iter()
            .map(|row| self.normalize_row(row, depth))
            .filter(|row| !(self.is_filtering() && is_empty_mapping(row)))
            .collect()
    }

    fn normalize_row(&self, row: &Value, depth: Depth) -> Value {
        match (row, depth) {
            (Value::Array(_), Depth::Nested) => Value::Object(self.normalize_nested(row)),
            (Value::Object(obj), Depth::Nested) if obj.contains_key("key") => {
                Value::Object(self.normalize_nested(&Value::Array(vec![row.clone()])))
            }
            (Value::Array(cells), Depth::Flat) => {
                let mut out = Map::new();
                for cell in cells {
                    if let Some(key) = self.accepted_key(cell) {
                        out.insert(key.to_string(), literal_of(cell));
                    }
                }
                Value::Object(out)
            }
            (Value::Object(obj), Depth::Flat) if obj.contains_key("key") => {
                let mut out = Map::new();
                if let Some(key) = self.accepted_key(row) {
                    out.insert(key.to_string(), literal_of(row));
                }
                Value::Object(out)
            }
            (other, _) => other.clone(),
        }
    }

    /// Returns the entry's key if it is present, non-empty and not sensitive.
    fn accepted_key<'v>(&self, entry: &'v Value) -> Option<&'v str> {
        let key = entry_key(entry)?;
        if self.sensitive_keys.contains(&key.to_ascii_lowercase()) {
            return None;
        }
        Some(key)
    }
}

/// The `key` of a wire entry, if it is a non-empty string.
pub fn entry_key(entry: &Value) -> Option<&str> {
    entry
        .get("key")
        .and_then(Value::as_str)
        .filter(|k| !k.is_empty())
}

fn literal_of(entry: &Value) -> Value {
    entry.get("value").cloned().unwrap_or(Value::Null)
}

fn is_empty_mapping(value: &Value) -> bool {
    matches!(value, Value::Object(map) if map.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_rows_become_lists() {
        let entries = json!([
            {"key": "orders", "values": [
                [
                    {"key": "id", "value": 1},
                    {"key": "lines", "values": [[{"key": "sku", "value": "A"}]]}
                ]
            ]}
        ]);
        let out = EntryNormalizer::new().normalize_nested(&entries);
        assert_eq!(
            Value::Object(out),
            json!({"orders": [{"id": 1, "lines": [{"sku": "A"}]}]})
        );
    }

    #[test]
    fn test_flat_rows_keep_literals() {
        let entries = json!([
            {"key": "orders", "values": [[{"key": "lines", "values": [1, 2]}]]}
        ]);
        let out = EntryNormalizer::new().normalize(&entries);
        assert_eq!(Value::Object(out), json!({"orders": [{"lines": null}]}));
    }

    #[test]
    fn test_unfiltered_keeps_empty_rows() {
        let entries = json!([{"key": "rows", "values": [[], "x"]}]);
        let out = EntryNormalizer::new().normalize(&entries);
        assert_eq!(out["rows"], json!([{}, "x"]));
    }
}
