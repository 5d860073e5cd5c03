use super::{FormatData, LeafFields, LeafSpec, SpecFields, SpecNode, empty_object};
use crate::coerce::{DataType, infer_type, is_blank};
use crate::entry::{EntryNormalizer, entry_key};
use crate::error::SpecBuildError;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What to do when a declared list's elements do not share the first element's shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListShapePolicy {
    /// Use the first element as the shape and ignore the rest.
    #[default]
    Lenient,
    /// Reject the declaration with [`SpecBuildError::HeterogeneousList`].
    Validate,
}

/// Derives a [`FormatData`] specification from a raw configuration payload.
#[derive(Debug, Clone, Default)]
pub struct SpecBuilder {
    normalizer: EntryNormalizer,
    list_shape: ListShapePolicy,
}

impl SpecBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list_shape(mut self, policy: ListShapePolicy) -> Self {
        self.list_shape = policy;
        self
    }

    /// Builds the spec for the first API call of the first configured step
    /// (`steps[0].apis[0]`). Returns `Ok(None)` when there is no such call.
    pub fn build(&self, config: &Value) -> Result<Option<FormatData>, SpecBuildError> {
        match config.pointer("/steps/0/apis/0") {
            Some(api @ Value::Object(_)) => self.build_api(api).map(Some),
            _ => Ok(None),
        }
    }

    /// Builds the spec for a single API configuration record.
    pub fn build_api(&self, api: &Value) -> Result<FormatData, SpecBuildError> {
        let text = |name: &str| api.get(name).and_then(Value::as_str).map(str::to_string);

        let spec = FormatData {
            domain: text("domain"),
            path: text("path"),
            method: text("method"),
            headers: self.leaf_fields(api.get("headers")),
            query_params: self.leaf_fields(api.get("queryParams")),
            body: self.body_fields(api.get("body"))?,
            expected_response: api
                .get("expectedResponse")
                .filter(|v| !v.is_null())
                .cloned()
                .unwrap_or_else(empty_object),
        };

        log::debug!(
            "Built spec for {} {}: {} headers, {} query params, {} body fields",
            spec.method.as_deref().unwrap_or("<any>"),
            spec.path.as_deref().unwrap_or(""),
            spec.headers.len(),
            spec.query_params.len(),
            spec.body.len()
        );
        Ok(spec)
    }

    fn leaf_fields(&self, section: Option<&Value>) -> LeafFields {
        match section {
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(|entry| Some((entry_key(entry)?.to_string(), leaf_from_entry(entry))))
                .collect(),
            Some(section @ Value::Object(_)) => self
                .normalizer
                .normalize(section)
                .into_iter()
                .map(|(k, v)| (k, leaf_from_sample(&v)))
                .collect(),
            _ => LeafFields::new(),
        }
    }

    fn body_fields(&self, section: Option<&Value>) -> Result<SpecFields, SpecBuildError> {
        match section {
            Some(Value::Array(entries)) => {
                let mut fields = SpecFields::new();
                for entry in entries {
                    let Some(key) = entry_key(entry) else {
                        continue;
                    };
                    let node = match entry.get("values") {
                        Some(Value::Array(rows)) => {
                            SpecNode::List(Box::new(self.element_shape(key, rows)?))
                        }
                        _ => SpecNode::Leaf(leaf_from_entry(entry)),
                    };
                    fields.insert(key.to_string(), node);
                }
                Ok(fields)
            }
            Some(section @ Value::Object(_)) => Ok(self
                .normalizer
                .normalize(section)
                .into_iter()
                .map(|(k, v)| (k, shape_from_sample(&v)))
                .collect()),
            _ => Ok(SpecFields::new()),
        }
    }

    /// Derives the canonical element shape of a declared list from its first row.
    fn element_shape(&self, field: &str, rows: &[Value]) -> Result<SpecNode, SpecBuildError> {
        let Some(first) = rows.first() else {
            return Ok(SpecNode::Object(SpecFields::new()));
        };

        let expected = row_signature(first);
        if let Some(index) = rows.iter().skip(1).position(|r| row_signature(r) != expected) {
            let index = index + 1;
            match self.list_shape {
                ListShapePolicy::Validate => {
                    return Err(SpecBuildError::HeterogeneousList {
                        field: field.to_string(),
                        index,
                    });
                }
                ListShapePolicy::Lenient => log::debug!(
                    "List field '{}' element {} differs from the first element; using the first",
                    field,
                    index
                ),
            }
        }

        let shape = match first {
            Value::Array(cells) => SpecNode::Object(
                cells
                    .iter()
                    .filter_map(|cell| {
                        Some((
                            entry_key(cell)?.to_string(),
                            SpecNode::Leaf(leaf_from_entry(cell)),
                        ))
                    })
                    .collect(),
            ),
            Value::Object(obj) if obj.contains_key("key") => {
                let mut fields = SpecFields::new();
                if let Some(key) = entry_key(first) {
                    fields.insert(key.to_string(), SpecNode::Leaf(leaf_from_entry(first)));
                }
                SpecNode::Object(fields)
            }
            Value::Object(obj) => SpecNode::Object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), SpecNode::Leaf(leaf_from_sample(v))))
                    .collect(),
            ),
            primitive => SpecNode::Leaf(LeafSpec::new(infer_type(primitive))),
        };
        Ok(shape)
    }
}

/// A leaf from a declared entry: the `dataType` hint wins, otherwise the type
/// is inferred from the sample value. Non-blank samples become the default.
fn leaf_from_entry(entry: &Value) -> LeafSpec {
    let sample = entry.get("value");
    let data_type = entry
        .get("dataType")
        .and_then(Value::as_str)
        .and_then(DataType::parse)
        .unwrap_or_else(|| sample.map_or(DataType::String, infer_type));
    LeafSpec {
        data_type,
        default: sample.filter(|v| !is_blank(v)).cloned(),
    }
}

fn leaf_from_sample(sample: &Value) -> LeafSpec {
    LeafSpec {
        data_type: infer_type(sample),
        default: Some(sample).filter(|v| !is_blank(v)).cloned(),
    }
}

/// Infers a whole subtree from an already-plain sample object.
fn shape_from_sample(sample: &Value) -> SpecNode {
    match sample {
        Value::Object(fields) => SpecNode::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), shape_from_sample(v)))
                .collect(),
        ),
        Value::Array(items) => SpecNode::List(Box::new(match items.first() {
            Some(first @ (Value::Object(_) | Value::Array(_))) => shape_from_sample(first),
            Some(first) => SpecNode::Leaf(LeafSpec::new(infer_type(first))),
            None => SpecNode::Object(SpecFields::new()),
        })),
        leaf => SpecNode::Leaf(leaf_from_sample(leaf)),
    }
}

/// The structural identity of a `values` row: the keys it declares, or
/// `None` for primitive rows.
fn row_signature(row: &Value) -> Option<AHashSet<&str>> {
    match row {
        Value::Array(cells) => Some(cells.iter().filter_map(entry_key).collect()),
        Value::Object(obj) if obj.contains_key("key") => Some(entry_key(row).into_iter().collect()),
        Value::Object(obj) => Some(obj.keys().map(String::as_str).collect()),
        _ => None,
    }
}
