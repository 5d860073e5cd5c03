//! Reconciles supplied step parameters with a specification.
//!
//! The mapper takes a raw step payload, routes every supplied key into
//! headers, query parameters or body, merges request metadata and coerces the
//! result. With a specification the declared types drive coercion; without one
//! every leaf is coerced by its inferred type.

mod extract;
pub mod routing;
mod strict;

use crate::coerce::coerce_loose_map;
use crate::diff::{SpecShape, diff_section};
use crate::entry::EntryNormalizer;
use crate::spec::{FormatData, empty_object};
use routing::{Destination, RouteContext, RouteRule, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A fully routed request, ready for the HTTP dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutedRequest {
    pub domain: String,
    pub path: String,
    pub method: String,
    pub headers: Map<String, Value>,
    pub query_params: Map<String, Value>,
    pub body: Map<String, Value>,
    pub expected_response: Value,
}

/// The mapped request plus any undeclared field paths found in strict mode.
///
/// `extras` is computed on the supplied values before coercion, so a path in
/// it need not exist in `format_param`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOutcome {
    pub format_param: RoutedRequest,
    pub extras: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapOptions {
    /// Report supplied fields the specification does not declare.
    pub strict: bool,
}

pub struct ParamMapper {
    normalizer: EntryNormalizer,
    router: Router,
    options: MapOptions,
}

pub struct ParamMapperBuilder {
    router: Router,
    options: MapOptions,
}

impl ParamMapperBuilder {
    pub fn new() -> Self {
        Self {
            router: Router::default(),
            options: MapOptions::default(),
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.options.strict = strict;
        self
    }

    /// Replaces the default set of header names that always route to headers.
    pub fn with_known_headers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.router = Router::with_known_headers(names);
        self
    }

    /// Adds a routing rule that runs after the built-in rules, before the method fallback.
    pub fn with_rule(mut self, rule: Box<dyn RouteRule>) -> Self {
        self.router.push(rule);
        self
    }

    pub fn build(self) -> ParamMapper {
        ParamMapper {
            normalizer: EntryNormalizer::new(),
            router: self.router,
            options: self.options,
        }
    }
}

impl Default for ParamMapperBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ParamMapper {
    fn default() -> Self {
        ParamMapperBuilder::new().build()
    }
}

impl ParamMapper {
    pub fn builder() -> ParamMapperBuilder {
        ParamMapperBuilder::new()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Maps a raw step payload using the mapper's configured options.
    pub fn map(&self, raw: &Value, spec: Option<&FormatData>) -> MapOutcome {
        self.map_with(raw, spec, self.options)
    }

    /// Maps a raw step payload.
    ///
    /// `raw` is either a list of steps (the first step's first `inputParam`
    /// entry is used) or an already-shaped `{method, params, headers,
    /// queryParams, body}` object. Never fails: unreadable values degrade to
    /// `null` or `""`.
    pub fn map_with(&self, raw: &Value, spec: Option<&FormatData>, options: MapOptions) -> MapOutcome {
        let extracted = extract::extract(raw, &self.normalizer);
        let declared = spec.filter(|s| s.has_declarations());

        let method = extracted
            .method
            .clone()
            .or_else(|| spec.and_then(|s| s.method.clone()))
            .unwrap_or_else(|| "GET".to_string())
            .to_ascii_uppercase();

        let mut headers = Map::new();
        let mut query_params = Map::new();
        let mut body = Map::new();
        let ctx = RouteContext {
            spec: declared,
            method: &method,
        };
        for (key, value) in extracted.params {
            let value = if value.is_null() {
                Value::String(String::new())
            } else {
                value
            };
            let section = match self.router.route(&key, &ctx) {
                Destination::Headers => &mut headers,
                Destination::QueryParams => &mut query_params,
                Destination::Body => &mut body,
            };
            section.insert(key, value);
        }
        body.extend(extracted.extra_body);
        headers.extend(extracted.headers);
        query_params.extend(extracted.query_params);
        body.extend(extracted.body);

        let merged = RoutedRequest {
            domain: text_field(raw, "domain")
                .or_else(|| spec.and_then(|s| s.domain.clone()))
                .unwrap_or_default(),
            path: text_field(raw, "path")
                .or_else(|| spec.and_then(|s| s.path.clone()))
                .unwrap_or_default(),
            method,
            headers,
            query_params,
            body,
            expected_response: raw
                .get("expectedResponse")
                .filter(|v| !v.is_null())
                .or_else(|| spec.map(|s| &s.expected_response))
                .cloned()
                .unwrap_or_else(empty_object),
        };

        let Some(spec) = declared else {
            let format_param = RoutedRequest {
                headers: coerce_loose_map(&merged.headers),
                query_params: coerce_loose_map(&merged.query_params),
                body: coerce_loose_map(&merged.body),
                ..merged
            };
            return MapOutcome {
                format_param,
                extras: Vec::new(),
            };
        };

        let extras = if options.strict {
            let mut extras = diff_section(&merged.headers, SpecShape::Leaves(&spec.headers), "headers");
            extras.extend(diff_section(
                &merged.query_params,
                SpecShape::Leaves(&spec.query_params),
                "queryParams",
            ));
            extras.extend(diff_section(&merged.body, SpecShape::Fields(&spec.body), "body"));
            if !extras.is_empty() {
                log::warn!(
                    "{} {} supplied {} undeclared field(s): {}",
                    merged.method,
                    merged.path,
                    extras.len(),
                    extras.join(", ")
                );
            }
            extras
        } else {
            Vec::new()
        };

        let format_param = RoutedRequest {
            headers: strict::coerce_leaf_fields(&merged.headers, &spec.headers),
            query_params: strict::coerce_leaf_fields(&merged.query_params, &spec.query_params),
            body: strict::coerce_body(&merged.body, &spec.body),
            ..merged
        };
        MapOutcome {
            format_param,
            extras,
        }
    }
}

fn text_field(raw: &Value, name: &str) -> Option<String> {
    match raw.get(name)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
