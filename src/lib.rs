//! # Kata - Parameter Specification and Type-Coercion Engine
//!
//! **Kata** turns the loosely typed parameters of an API test step into a
//! typed, routed request. Two JSON shapes evolve independently in a test
//! automation backend: the saved configuration says which parameters an API
//! call accepts and of what type, and each test step says which values were
//! actually supplied. Kata reconciles them.
//!
//! ## Core Workflow
//!
//! 1.  **Build a Spec**: When a node's configuration is saved, feed it to the
//!     [`SpecBuilder`](spec::SpecBuilder) to get a [`FormatData`](spec::FormatData)
//!     tree. Persist it with [`SpecArtifact`](spec::SpecArtifact) if you want to skip
//!     rebuilding it.
//! 2.  **Map a Step**: At dispatch time, hand the step's raw parameters and the
//!     spec to a [`ParamMapper`](mapper::ParamMapper). Every key is routed into
//!     headers, query parameters or body and coerced to its declared type.
//! 3.  **Check Extras**: In strict mode the outcome also lists every supplied
//!     field the spec does not declare. Whether that fails the step is up to you.
//!
//! Mapping never fails. Unreadable values become `null` (or `""` for strings),
//! so a malformed step still produces a best-effort request.
//!
//! ## Quick Start
//!
//! ```rust
//! use kata::prelude::*;
//! use serde_json::json;
//!
//! let config = json!({
//!     "steps": [{
//!         "apis": [{
//!             "domain": "https://api.example.com",
//!             "path": "/users",
//!             "method": "POST",
//!             "headers": [{"key": "Content-Type", "value": "application/json"}],
//!             "body": [{"key": "age", "dataType": "Int"}]
//!         }]
//!     }]
//! });
//! let spec = SpecBuilder::new().build(&config).unwrap().expect("api configured");
//!
//! let step = json!([{
//!     "inputParam": [{"method": "POST", "params": [{"key": "age", "value": "30"}]}]
//! }]);
//! let outcome = ParamMapper::builder().strict(true).build().map(&step, Some(&spec));
//!
//! assert_eq!(outcome.format_param.body["age"], json!(30));
//! assert_eq!(outcome.format_param.headers["Content-Type"], json!("application/json"));
//! assert!(outcome.extras.is_empty());
//! ```

pub mod coerce;
pub mod config;
pub mod diff;
pub mod entry;
pub mod error;
pub mod mapper;
pub mod prelude;
pub mod report;
pub mod spec;
