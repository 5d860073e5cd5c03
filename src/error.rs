use thiserror::Error;

/// Errors that can occur while deriving a `FormatData` specification from configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpecBuildError {
    #[error(
        "List field '{field}' has an element at index {index} whose shape differs from the first element"
    )]
    HeterogeneousList { field: String, index: usize },

    #[error("Invalid specification shape: {0}")]
    InvalidShape(String),
}

/// Errors raised while persisting or loading a compiled specification artifact.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Serialization failed: {0}")]
    Encode(String),

    #[error("Deserialization failed: {0}")]
    Decode(String),

    #[error("Stored default value for '{field}' is not valid JSON: {source}")]
    DefaultValue {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not access file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while loading engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
