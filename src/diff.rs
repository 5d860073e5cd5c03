//! Extra-field detection.
//!
//! Walks a supplied param tree against a specification tree and reports every
//! path the specification does not declare. Missing fields are never reported.

use crate::coerce::is_blank;
use crate::spec::{LeafFields, LeafSpec, SpecFields, SpecNode};
use itertools::Itertools;
use serde_json::{Map, Value};
use std::fmt;

/// A borrowed view of any level of a specification.
#[derive(Debug, Clone, Copy)]
pub enum SpecShape<'a> {
    Leaf(&'a LeafSpec),
    Fields(&'a SpecFields),
    /// Header and query sections, whose children are all leaves.
    Leaves(&'a LeafFields),
    List(&'a SpecNode),
}

impl<'a> From<&'a SpecNode> for SpecShape<'a> {
    fn from(node: &'a SpecNode) -> Self {
        match node {
            SpecNode::Leaf(leaf) => SpecShape::Leaf(leaf),
            SpecNode::Object(fields) => SpecShape::Fields(fields),
            SpecNode::List(shape) => SpecShape::List(shape),
        }
    }
}

impl<'a> SpecShape<'a> {
    fn child(&self, key: &str) -> Option<SpecShape<'a>> {
        match *self {
            SpecShape::Fields(fields) => fields.get(key).map(SpecShape::from),
            SpecShape::Leaves(leaves) => leaves.get(key).map(SpecShape::Leaf),
            SpecShape::Leaf(_) | SpecShape::List(_) => None,
        }
    }

    fn is_mapping(&self) -> bool {
        matches!(self, SpecShape::Fields(_) | SpecShape::Leaves(_))
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Key(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Reports the dotted paths (list indices included) of every supplied field
/// that `shape` does not declare, prefixed by `root`.
pub fn diff_extra_fields(param: &Value, shape: SpecShape<'_>, root: &str) -> Vec<String> {
    let mut extras = Vec::new();
    let mut path = vec![Segment::Key(root.to_string())];
    walk(param, shape, &mut path, &mut extras);
    extras
}

/// [`diff_extra_fields`] for a whole request section.
pub fn diff_section(params: &Map<String, Value>, shape: SpecShape<'_>, root: &str) -> Vec<String> {
    let mut extras = Vec::new();
    let mut path = vec![Segment::Key(root.to_string())];
    walk_mapping(params, shape, &mut path, &mut extras);
    extras
}

fn walk(param: &Value, shape: SpecShape<'_>, path: &mut Vec<Segment>, extras: &mut Vec<String>) {
    match (param, shape) {
        (Value::Array(items), SpecShape::List(element)) => {
            for (index, item) in items.iter().enumerate() {
                path.push(Segment::Index(index));
                walk(item, SpecShape::from(element), path, extras);
                path.pop();
            }
        }
        // An object supplied where a list is declared is checked as one element.
        (Value::Object(_), SpecShape::List(element)) => {
            walk(param, SpecShape::from(element), path, extras)
        }
        (Value::Object(fields), shape) if shape.is_mapping() => {
            walk_mapping(fields, shape, path, extras)
        }
        (Value::Object(_), SpecShape::Leaf(_)) => extras.push(render(path)),
        (scalar, shape) if shape.is_mapping() && !scalar.is_array() && !is_blank(scalar) => {
            extras.push(render(path))
        }
        _ => {}
    }
}

fn walk_mapping(
    fields: &Map<String, Value>,
    shape: SpecShape<'_>,
    path: &mut Vec<Segment>,
    extras: &mut Vec<String>,
) {
    for (key, value) in fields {
        path.push(Segment::Key(key.clone()));
        match shape.child(key) {
            Some(child) => walk(value, child, path, extras),
            None => extras.push(render(path)),
        }
        path.pop();
    }
}

fn render(path: &[Segment]) -> String {
    path.iter().join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::DataType;
    use serde_json::json;

    fn order_fields() -> SpecFields {
        let mut item = SpecFields::new();
        item.insert("sku".into(), SpecNode::Leaf(LeafSpec::new(DataType::String)));
        let mut fields = SpecFields::new();
        fields.insert("id".into(), SpecNode::Leaf(LeafSpec::new(DataType::Int)));
        fields.insert(
            "items".into(),
            SpecNode::List(Box::new(SpecNode::Object(item))),
        );
        fields
    }

    #[test]
    fn test_extra_inside_list_elements() {
        let fields = order_fields();
        let param = json!({"id": 1, "items": [{"sku": "a"}, {"sku": "b", "qty": 2}]});
        let extras = diff_extra_fields(&param, SpecShape::Fields(&fields), "body");
        assert_eq!(extras, vec!["body.items.1.qty"]);
    }

    #[test]
    fn test_object_at_leaf_is_reported_once() {
        let fields = order_fields();
        let param = json!({"id": {"nested": true}});
        let extras = diff_extra_fields(&param, SpecShape::Fields(&fields), "body");
        assert_eq!(extras, vec!["body.id"]);
    }

    #[test]
    fn test_missing_and_blank_fields_are_not_reported() {
        let mut fields = order_fields();
        fields.insert("address".into(), SpecNode::Object(SpecFields::new()));
        let param = json!({"address": ""});
        assert!(diff_extra_fields(&param, SpecShape::Fields(&fields), "body").is_empty());
    }
}
