use crate::spec::FormatData;
use ahash::AHashSet;

/// The section of a request a supplied parameter is sent in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Headers,
    QueryParams,
    Body,
}

/// What a routing rule may look at when placing one key.
pub struct RouteContext<'a> {
    /// The specification, only when it declares at least one parameter.
    pub spec: Option<&'a FormatData>,
    /// Upper-cased request method.
    pub method: &'a str,
}

/// One step of the routing precedence chain.
///
/// A rule returns `Some` to claim a key or `None` to defer to the next rule.
pub trait RouteRule: Send + Sync {
    fn name(&self) -> &str;
    fn route(&self, key: &str, ctx: &RouteContext<'_>) -> Option<Destination>;
}

/// Keys declared as spec headers.
pub struct DeclaredHeaderRule;

impl RouteRule for DeclaredHeaderRule {
    fn name(&self) -> &str {
        "declared-header"
    }
    fn route(&self, key: &str, ctx: &RouteContext<'_>) -> Option<Destination> {
        let spec = ctx.spec?;
        spec.headers
            .contains_key(key)
            .then_some(Destination::Headers)
    }
}

/// Well-known HTTP header names, matched case-insensitively.
pub struct KnownHeaderRule {
    names: AHashSet<String>,
}

impl KnownHeaderRule {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }
}

impl RouteRule for KnownHeaderRule {
    fn name(&self) -> &str {
        "known-header"
    }
    fn route(&self, key: &str, _ctx: &RouteContext<'_>) -> Option<Destination> {
        self.names
            .contains(&key.to_ascii_lowercase())
            .then_some(Destination::Headers)
    }
}

/// Keys declared in the spec body.
pub struct DeclaredBodyRule;

impl RouteRule for DeclaredBodyRule {
    fn name(&self) -> &str {
        "declared-body"
    }
    fn route(&self, key: &str, ctx: &RouteContext<'_>) -> Option<Destination> {
        let spec = ctx.spec?;
        spec.body.contains_key(key).then_some(Destination::Body)
    }
}

/// Keys declared as spec query parameters.
pub struct DeclaredQueryRule;

impl RouteRule for DeclaredQueryRule {
    fn name(&self) -> &str {
        "declared-query"
    }
    fn route(&self, key: &str, ctx: &RouteContext<'_>) -> Option<Destination> {
        let spec = ctx.spec?;
        spec.query_params
            .contains_key(key)
            .then_some(Destination::QueryParams)
    }
}

/// `GET` and `DELETE` send leftovers as query parameters, every other method in the body.
pub fn method_fallback(method: &str) -> Destination {
    match method {
        "GET" | "DELETE" => Destination::QueryParams,
        _ => Destination::Body,
    }
}

pub const DEFAULT_KNOWN_HEADERS: [&str; 4] =
    ["Authorization", "Content-Type", "Accept", "User-Agent"];

/// The ordered routing chain. The method fallback always closes the chain.
pub struct Router {
    rules: Vec<Box<dyn RouteRule>>,
}

impl Router {
    pub fn with_known_headers<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            rules: vec![
                Box::new(DeclaredHeaderRule),
                Box::new(KnownHeaderRule::new(names)),
                Box::new(DeclaredBodyRule),
                Box::new(DeclaredQueryRule),
            ],
        }
    }

    /// Appends a rule after the built-in ones, ahead of the method fallback.
    pub fn push(&mut self, rule: Box<dyn RouteRule>) {
        self.rules.push(rule);
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn route(&self, key: &str, ctx: &RouteContext<'_>) -> Destination {
        for rule in &self.rules {
            if let Some(destination) = rule.route(key, ctx) {
                log::debug!("Routed '{}' to {:?} by {}", key, destination, rule.name());
                return destination;
            }
        }
        let destination = method_fallback(ctx.method);
        log::debug!("Routed '{}' to {:?} by method fallback", key, destination);
        destination
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::with_known_headers(DEFAULT_KNOWN_HEADERS)
    }
}
