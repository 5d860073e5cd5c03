//! Primitive type inference and value coercion.
//!
//! Coercion is total: every input produces a value. Anything that cannot be
//! read as the requested type degrades to `null` (or `""` for `String`), so a
//! mapping run always yields a structurally complete tree.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

static INTEGER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+$").unwrap());
static FLOAT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").unwrap());

/// The logical types a specification leaf can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    String,
    Int,
    Float,
    Boolean,
    Object,
    List,
}

impl DataType {
    /// Reads a declared type hint as written by the configuration editor.
    ///
    /// Matching is case-insensitive and any `List<...>` spelling maps to `List`.
    /// Returns `None` for blank or unrecognised hints so callers can fall back
    /// to inference.
    pub fn parse(hint: &str) -> Option<Self> {
        let hint = hint.trim().to_ascii_lowercase();
        if hint.starts_with("list") {
            return Some(DataType::List);
        }
        match hint.as_str() {
            "string" => Some(DataType::String),
            "int" | "integer" => Some(DataType::Int),
            "float" | "double" | "number" => Some(DataType::Float),
            "boolean" | "bool" => Some(DataType::Boolean),
            "object" => Some(DataType::Object),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "String",
            DataType::Int => "Int",
            DataType::Float => "Float",
            DataType::Boolean => "Boolean",
            DataType::Object => "Object",
            DataType::List => "List",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Infers the logical type of a raw value.
pub fn infer_type(raw: &Value) -> DataType {
    match raw {
        Value::Bool(_) => DataType::Boolean,
        Value::Number(n) => {
            if is_integral(n) {
                DataType::Int
            } else {
                DataType::Float
            }
        }
        Value::String(s) if s == "true" || s == "false" => DataType::Boolean,
        Value::String(s) if INTEGER_RE.is_match(s) => DataType::Int,
        Value::String(s) if FLOAT_RE.is_match(s) => DataType::Float,
        Value::Array(_) => DataType::List,
        Value::Object(_) => DataType::Object,
        _ => DataType::String,
    }
}

/// Coerces `raw` into `data_type`. A missing value and an explicit `null` are both nil.
pub fn coerce(data_type: DataType, raw: Option<&Value>) -> Value {
    let raw = match raw {
        None | Some(Value::Null) => {
            return match data_type {
                DataType::String => Value::String(String::new()),
                _ => Value::Null,
            };
        }
        Some(raw) => raw,
    };

    match data_type {
        DataType::Int => coerce_int(raw),
        DataType::Float => coerce_float(raw),
        DataType::Boolean => coerce_bool(raw),
        DataType::String => Value::String(stringify(raw)),
        // Containers are walked by the caller; only their leaves get coerced.
        DataType::Object | DataType::List => raw.clone(),
    }
}

/// Coerces every leaf of a tree by its own inferred type.
pub fn coerce_loose(node: &Value) -> Value {
    match node {
        Value::Array(items) => Value::Array(items.iter().map(coerce_loose).collect()),
        Value::Object(fields) => Value::Object(coerce_loose_map(fields)),
        leaf => coerce(infer_type(leaf), Some(leaf)),
    }
}

pub fn coerce_loose_map(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), coerce_loose(v)))
        .collect()
}

/// Reports whether a value is absent for fallback purposes: `null` or a blank string.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn is_integral(n: &Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

fn coerce_int(raw: &Value) -> Value {
    match raw {
        Value::Number(n) if n.is_i64() || n.is_u64() => raw.clone(),
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.is_finite())
            .map(|f| Value::from(f.trunc() as i64))
            .unwrap_or(Value::Null),
        other => {
            let text = stringify(other);
            if !INTEGER_RE.is_match(&text) {
                return Value::Null;
            }
            if let Ok(i) = text.parse::<i64>() {
                Value::from(i)
            } else if let Ok(u) = text.parse::<u64>() {
                Value::from(u)
            } else {
                Value::Null
            }
        }
    }
}

fn coerce_float(raw: &Value) -> Value {
    match raw {
        Value::Number(_) => raw.clone(),
        other => {
            let text = stringify(other);
            if !FLOAT_RE.is_match(&text) {
                return Value::Null;
            }
            text.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        }
    }
}

fn coerce_bool(raw: &Value) -> Value {
    match raw {
        Value::Bool(_) => raw.clone(),
        other => match stringify(other).to_ascii_lowercase().as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::Null,
        },
    }
}

/// Renders a non-null value as text. Strings are taken verbatim; containers
/// become their compact JSON form.
fn stringify(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        container => container.to_string(),
    }
}
