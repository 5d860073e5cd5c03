//! The `FormatData` specification tree.
//!
//! A specification says which parameters a configured API call accepts and
//! what type each one has. It is derived from saved configuration by the
//! [`SpecBuilder`] and rebuilt (never patched) whenever that configuration
//! changes.

mod artifact;
mod builder;

pub use artifact::SpecArtifact;
pub use builder::{ListShapePolicy, SpecBuilder};

use crate::coerce::{DataType, infer_type};
use crate::error::SpecBuildError;
use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Declared children of an object node, in declaration order.
pub type SpecFields = IndexMap<String, SpecNode>;
/// Declared header or query parameters, which are always leaves.
pub type LeafFields = IndexMap<String, LeafSpec>;

/// A declared parameter with no children.
///
/// `default` present means the parameter has a declared default value;
/// absent means it is required.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafSpec {
    #[serde(rename = "dataType")]
    pub data_type: DataType,
    #[serde(rename = "value", skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl LeafSpec {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            default: None,
        }
    }

    pub fn with_default(data_type: DataType, default: Value) -> Self {
        Self {
            data_type,
            default: Some(default),
        }
    }
}

/// One node of the specification tree.
///
/// A `List` holds the single canonical shape shared by every element of the
/// runtime list. The shape is taken from the first declared element.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecNode {
    Leaf(LeafSpec),
    Object(SpecFields),
    List(Box<SpecNode>),
}

impl SpecNode {
    /// Reads a node from its JSON wire form: `{"dataType": ..}` is a leaf,
    /// any other object is an object node, an array is a list node described
    /// by its first element.
    pub fn from_value(value: &Value) -> Result<Self, SpecBuildError> {
        match value {
            Value::Object(map) if map.contains_key("dataType") => {
                let default = map.get("value").filter(|v| !v.is_null()).cloned();
                let data_type = match map.get("dataType") {
                    Some(Value::String(hint)) => DataType::parse(hint),
                    Some(Value::Null) => None,
                    Some(other) => {
                        return Err(SpecBuildError::InvalidShape(format!(
                            "dataType must be a string, found {}",
                            other
                        )));
                    }
                    None => None,
                }
                .unwrap_or_else(|| default.as_ref().map_or(DataType::String, infer_type));
                Ok(SpecNode::Leaf(LeafSpec { data_type, default }))
            }
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| Ok((k.clone(), SpecNode::from_value(v)?)))
                .collect::<Result<SpecFields, _>>()
                .map(SpecNode::Object),
            Value::Array(items) => {
                let shape = match items.first() {
                    Some(first) => SpecNode::from_value(first)?,
                    None => SpecNode::Object(SpecFields::new()),
                };
                Ok(SpecNode::List(Box::new(shape)))
            }
            other => Err(SpecBuildError::InvalidShape(format!(
                "expected an object or array node, found {}",
                other
            ))),
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafSpec> {
        match self {
            SpecNode::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for LeafSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match SpecNode::from_value(&value).map_err(D::Error::custom)? {
            SpecNode::Leaf(leaf) => Ok(leaf),
            _ => Err(D::Error::custom(format!(
                "expected a leaf with a dataType, found {}",
                value
            ))),
        }
    }
}

impl Serialize for SpecNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SpecNode::Leaf(leaf) => leaf.serialize(serializer),
            SpecNode::Object(fields) => fields.serialize(serializer),
            SpecNode::List(shape) => std::slice::from_ref(shape.as_ref()).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for SpecNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        SpecNode::from_value(&value).map_err(D::Error::custom)
    }
}

/// The full specification of one configured API call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: LeafFields,
    #[serde(default)]
    pub query_params: LeafFields,
    #[serde(default)]
    pub body: SpecFields,
    #[serde(default = "empty_object")]
    pub expected_response: Value,
}

impl Default for FormatData {
    fn default() -> Self {
        Self {
            domain: None,
            path: None,
            method: None,
            headers: LeafFields::new(),
            query_params: LeafFields::new(),
            body: SpecFields::new(),
            expected_response: empty_object(),
        }
    }
}

impl FormatData {
    /// True when at least one header, query or body parameter is declared.
    pub fn has_declarations(&self) -> bool {
        !self.headers.is_empty() || !self.query_params.is_empty() || !self.body.is_empty()
    }

    pub fn from_value(value: &Value) -> Result<Self, SpecBuildError> {
        serde_json::from_value(value.clone())
            .map_err(|e| SpecBuildError::InvalidShape(e.to_string()))
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

pub(crate) fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}
