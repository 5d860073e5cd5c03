//! Wire-entry normalization.
//!
//! Parameters arrive from the editor as lists of `{key, value}` or
//! `{key, values}` entries. This module turns those lists into plain
//! key/value trees.

mod normalizer;
mod steps;

pub use normalizer::{EntryNormalizer, entry_key};
pub use steps::{NormalizedInput, NormalizedStep, normalize_steps};
