//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and functions from the kata crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use kata::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let config: serde_json::Value =
//!     serde_json::from_str(&std::fs::read_to_string("path/to/config.json")?)?;
//! let step: serde_json::Value =
//!     serde_json::from_str(&std::fs::read_to_string("path/to/step.json")?)?;
//!
//! let spec = SpecBuilder::new().build(&config)?;
//! let outcome = ParamMapper::default().map(&step, spec.as_ref());
//!
//! println!("{}", OutcomeFormatter::format_outcome(&outcome));
//! # Ok(())
//! # }
//! ```

// Spec building and mapping
pub use crate::mapper::{MapOptions, MapOutcome, ParamMapper, RoutedRequest};
pub use crate::spec::{FormatData, LeafSpec, ListShapePolicy, SpecArtifact, SpecBuilder, SpecNode};

// Coercion and normalization
pub use crate::coerce::{DataType, coerce, infer_type};
pub use crate::diff::{SpecShape, diff_extra_fields};
pub use crate::entry::{EntryNormalizer, normalize_steps};

// Configuration
pub use crate::config::EngineConfig;

// Error types
pub use crate::error::{ArtifactError, ConfigError, SpecBuildError};

// Report formatting
pub use crate::report::OutcomeFormatter;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
