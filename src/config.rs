use crate::entry::EntryNormalizer;
use crate::error::ConfigError;
use crate::mapper::ParamMapper;
use crate::mapper::routing::DEFAULT_KNOWN_HEADERS;
use crate::spec::{ListShapePolicy, SpecBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Engine settings, usually loaded from a JSON file next to the service config.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Entry keys removed by the filtering normalizer, matched case-insensitively.
    pub sensitive_keys: Vec<String>,
    /// Header names that always route to headers.
    pub known_headers: Vec<String>,
    pub strict: bool,
    pub list_shape: ListShapePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sensitive_keys: vec!["authorization".to_string()],
            known_headers: DEFAULT_KNOWN_HEADERS.iter().map(|h| h.to_string()).collect(),
            strict: false,
            list_shape: ListShapePolicy::Lenient,
        }
    }
}

impl EngineConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn mapper(&self) -> ParamMapper {
        ParamMapper::builder()
            .strict(self.strict)
            .with_known_headers(&self.known_headers)
            .build()
    }

    pub fn spec_builder(&self) -> SpecBuilder {
        SpecBuilder::new().with_list_shape(self.list_shape)
    }

    /// A normalizer that drops the configured sensitive keys.
    pub fn filtered_normalizer(&self) -> EntryNormalizer {
        EntryNormalizer::filtered(&self.sensitive_keys)
    }
}
