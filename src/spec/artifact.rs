use super::{FormatData, LeafFields, LeafSpec, SpecFields, SpecNode};
use crate::coerce::DataType;
use crate::error::ArtifactError;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

const FORMAT_VERSION: u32 = 1;

// bincode is not self-describing, so JSON payloads are kept as text.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct StoredLeaf {
    data_type: DataType,
    default: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
enum StoredNode {
    Leaf(StoredLeaf),
    Object(Vec<(String, StoredNode)>),
    List(Box<StoredNode>),
}

/// A built specification in its persisted binary form.
///
/// The datastore keeps one of these next to the raw configuration so the spec
/// does not have to be rebuilt on every execution.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SpecArtifact {
    version: u32,
    domain: Option<String>,
    path: Option<String>,
    method: Option<String>,
    headers: Vec<(String, StoredLeaf)>,
    query_params: Vec<(String, StoredLeaf)>,
    body: Vec<(String, StoredNode)>,
    expected_response: String,
}

impl SpecArtifact {
    pub fn from_spec(spec: &FormatData) -> Result<Self, ArtifactError> {
        Ok(Self {
            version: FORMAT_VERSION,
            domain: spec.domain.clone(),
            path: spec.path.clone(),
            method: spec.method.clone(),
            headers: store_leaves(&spec.headers)?,
            query_params: store_leaves(&spec.query_params)?,
            body: store_fields(&spec.body)?,
            expected_response: to_json_text(&spec.expected_response)?,
        })
    }

    pub fn into_spec(self) -> Result<FormatData, ArtifactError> {
        Ok(FormatData {
            domain: self.domain,
            path: self.path,
            method: self.method,
            headers: load_leaves(self.headers)?,
            query_params: load_leaves(self.query_params)?,
            body: load_fields(self.body)?,
            expected_response: from_json_text("expectedResponse", &self.expected_response)?,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        encode_to_vec(self, standard()).map_err(|e| ArtifactError::Encode(e.to_string()))
    }

    /// Deserializes an artifact, rejecting bytes written by another format version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let (artifact, _): (Self, usize) =
            decode_from_slice(bytes, standard()).map_err(|e| ArtifactError::Decode(e.to_string()))?;
        if artifact.version != FORMAT_VERSION {
            return Err(ArtifactError::Decode(format!(
                "unsupported artifact version {} (expected {})",
                artifact.version, FORMAT_VERSION
            )));
        }
        Ok(artifact)
    }

    /// Saves the artifact to a file using the bincode format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        let mut file = fs::File::create(path).map_err(|e| io_error(path, e))?;
        file.write_all(&bytes).map_err(|e| io_error(path, e))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let mut file = fs::File::open(path).map_err(|e| io_error(path, e))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(|e| io_error(path, e))?;
        Self::from_bytes(&bytes)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ArtifactError {
    ArtifactError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn to_json_text(value: &Value) -> Result<String, ArtifactError> {
    serde_json::to_string(value).map_err(|e| ArtifactError::Encode(e.to_string()))
}

fn from_json_text(field: &str, text: &str) -> Result<Value, ArtifactError> {
    serde_json::from_str(text).map_err(|source| ArtifactError::DefaultValue {
        field: field.to_string(),
        source,
    })
}

fn store_leaf(leaf: &LeafSpec) -> Result<StoredLeaf, ArtifactError> {
    Ok(StoredLeaf {
        data_type: leaf.data_type,
        default: leaf.default.as_ref().map(to_json_text).transpose()?,
    })
}

fn load_leaf(field: &str, leaf: StoredLeaf) -> Result<LeafSpec, ArtifactError> {
    Ok(LeafSpec {
        data_type: leaf.data_type,
        default: leaf
            .default
            .map(|text| from_json_text(field, &text))
            .transpose()?,
    })
}

fn store_leaves(leaves: &LeafFields) -> Result<Vec<(String, StoredLeaf)>, ArtifactError> {
    leaves
        .iter()
        .map(|(k, leaf)| Ok((k.clone(), store_leaf(leaf)?)))
        .collect()
}

fn load_leaves(stored: Vec<(String, StoredLeaf)>) -> Result<LeafFields, ArtifactError> {
    stored
        .into_iter()
        .map(|(k, leaf)| {
            let leaf = load_leaf(&k, leaf)?;
            Ok((k, leaf))
        })
        .collect()
}

fn store_node(node: &SpecNode) -> Result<StoredNode, ArtifactError> {
    Ok(match node {
        SpecNode::Leaf(leaf) => StoredNode::Leaf(store_leaf(leaf)?),
        SpecNode::Object(fields) => StoredNode::Object(store_fields(fields)?),
        SpecNode::List(shape) => StoredNode::List(Box::new(store_node(shape)?)),
    })
}

fn load_node(field: &str, node: StoredNode) -> Result<SpecNode, ArtifactError> {
    Ok(match node {
        StoredNode::Leaf(leaf) => SpecNode::Leaf(load_leaf(field, leaf)?),
        StoredNode::Object(fields) => SpecNode::Object(load_fields(fields)?),
        StoredNode::List(shape) => SpecNode::List(Box::new(load_node(field, *shape)?)),
    })
}

fn store_fields(fields: &SpecFields) -> Result<Vec<(String, StoredNode)>, ArtifactError> {
    fields
        .iter()
        .map(|(k, node)| Ok((k.clone(), store_node(node)?)))
        .collect()
}

fn load_fields(stored: Vec<(String, StoredNode)>) -> Result<SpecFields, ArtifactError> {
    stored
        .into_iter()
        .map(|(k, node)| {
            let node = load_node(&k, node)?;
            Ok((k, node))
        })
        .collect()
}
