use crate::coerce::{coerce, coerce_loose_map, is_blank};
use crate::spec::{LeafFields, SpecFields, SpecNode};
use serde_json::{Map, Value};

/// Keeps exactly the declared header/query keys, each coerced by its declared
/// type. A key that was not supplied takes the declared default.
pub(super) fn coerce_leaf_fields(merged: &Map<String, Value>, declared: &LeafFields) -> Map<String, Value> {
    if declared.is_empty() {
        return coerce_loose_map(merged);
    }
    declared
        .iter()
        .map(|(key, leaf)| {
            let raw = merged.get(key).or(leaf.default.as_ref());
            (key.clone(), coerce(leaf.data_type, raw))
        })
        .collect()
}

/// Walks the declared body tree and coerces the supplied values along it.
pub(super) fn coerce_body(merged: &Map<String, Value>, declared: &SpecFields) -> Map<String, Value> {
    if declared.is_empty() {
        return coerce_loose_map(merged);
    }
    declared
        .iter()
        .map(|(key, node)| (key.clone(), coerce_node(merged.get(key), node)))
        .collect()
}

fn coerce_node(param: Option<&Value>, node: &SpecNode) -> Value {
    match node {
        SpecNode::List(shape) => match param {
            Some(Value::Array(items)) => Value::Array(
                items
                    .iter()
                    .map(|item| coerce_node(Some(item), shape))
                    .collect(),
            ),
            _ => Value::Array(Vec::new()),
        },
        SpecNode::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, child)| {
                    let supplied = param.and_then(|p| p.as_object()).and_then(|p| p.get(key));
                    (key.clone(), coerce_node(supplied, child))
                })
                .collect(),
        ),
        SpecNode::Leaf(leaf) => {
            let supplied = param.filter(|v| !is_blank(v));
            coerce(leaf.data_type, supplied.or(leaf.default.as_ref()))
        }
    }
}
