//! Naming conventions that turn identifiers into route segments and verbs.
//!
//! A controller method called `GetDetail` is matched against an ordered list
//! of [`PrefixRule`]s. The first rule whose prefix starts the name decides the
//! verb, and the rest of the name (`Detail`) is run through the [`NamingRule`]
//! to become the path segment (`/detail`).

use std::{fmt, str::FromStr, sync::Arc};

use axum::routing::MethodFilter;
use serde::{Deserialize, Serialize};

/// Returns `true` when `name` follows the exported-identifier convention
/// (first character is an ASCII capital).
pub fn is_public(name: &str) -> bool {
    name.as_bytes().first().is_some_and(u8::is_ascii_uppercase)
}

/// Default naming rule: lower-cases the first character and leaves the rest.
pub fn lower_first(identifier: &str) -> String {
    let mut chars = identifier.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Caller-replaceable identifier-to-segment function.
#[derive(Clone)]
pub struct NamingRule(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl NamingRule {
    pub fn new<F>(rule: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(rule))
    }

    pub fn apply(&self, identifier: &str) -> String {
        (self.0)(identifier)
    }

    /// Produces the `/segment` for a stripped method-name remainder.
    pub fn route_segment(&self, remainder: &str) -> String {
        format!("/{}", self.apply(remainder))
    }
}

impl Default for NamingRule {
    fn default() -> Self {
        Self::new(lower_first)
    }
}

impl fmt::Debug for NamingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NamingRule(..)")
    }
}

/// HTTP verbs a prefix can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpVerb {
    /// Upper-case wire name, as registered with the router.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }

    /// Lower-case name, as recorded in route metadata.
    pub fn as_lower(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
            Self::Patch => "patch",
            Self::Head => "head",
            Self::Options => "options",
        }
    }

    pub fn method_filter(self) -> MethodFilter {
        match self {
            Self::Get => MethodFilter::GET,
            Self::Post => MethodFilter::POST,
            Self::Put => MethodFilter::PUT,
            Self::Delete => MethodFilter::DELETE,
            Self::Patch => MethodFilter::PATCH,
            Self::Head => MethodFilter::HEAD,
            Self::Options => MethodFilter::OPTIONS,
        }
    }

    /// Verbs whose requests are not expected to carry a body.
    pub fn is_bodyless(self) -> bool {
        matches!(self, Self::Get | Self::Head | Self::Options)
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpVerb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" => Ok(Self::Post),
            "put" => Ok(Self::Put),
            "delete" => Ok(Self::Delete),
            "patch" => Ok(Self::Patch),
            "head" => Ok(Self::Head),
            "option" | "options" => Ok(Self::Options),
            other => Err(format!("unknown http method `{other}`")),
        }
    }
}

impl TryFrom<String> for HttpVerb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HttpVerb> for String {
    fn from(verb: HttpVerb) -> Self {
        verb.as_str().to_string()
    }
}

/// One `prefix -> verb` pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixRule {
    pub prefix: String,
    pub method: HttpVerb,
}

impl PrefixRule {
    pub fn new(prefix: impl Into<String>, method: HttpVerb) -> Self {
        Self {
            prefix: prefix.into(),
            method,
        }
    }
}

/// Ordered prefix table. Matching is first-match-in-declared-order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixRules(Vec<PrefixRule>);

impl PrefixRules {
    /// Replaces the default table entirely.
    pub fn new(rules: impl IntoIterator<Item = PrefixRule>) -> Self {
        Self(rules.into_iter().collect())
    }

    /// Adds rules after the existing ones; earlier rules keep precedence.
    pub fn append(&mut self, rules: impl IntoIterator<Item = PrefixRule>) {
        self.0.extend(rules);
    }

    pub fn rules(&self) -> &[PrefixRule] {
        &self.0
    }

    /// Matches `method_name` against the table.
    ///
    /// Returns the verb of the first matching rule and the stripped remainder.
    /// An empty remainder yields `None` without consulting later rules.
    pub fn match_method<'a>(&self, method_name: &'a str) -> Option<(HttpVerb, &'a str)> {
        let rule = self
            .0
            .iter()
            .find(|rule| method_name.starts_with(rule.prefix.as_str()))?;
        let remainder = &method_name[rule.prefix.len()..];
        if remainder.is_empty() {
            return None;
        }
        Some((rule.method, remainder))
    }
}

impl Default for PrefixRules {
    fn default() -> Self {
        Self(vec![
            PrefixRule::new("Get", HttpVerb::Get),
            PrefixRule::new("Post", HttpVerb::Post),
            PrefixRule::new("Put", HttpVerb::Put),
            PrefixRule::new("Delete", HttpVerb::Delete),
            PrefixRule::new("Patch", HttpVerb::Patch),
            PrefixRule::new("Head", HttpVerb::Head),
            PrefixRule::new("Option", HttpVerb::Options),
        ])
    }
}

/// Joins path pieces the way a cleaned URL path reads: rooted at `/`,
/// no empty or `.` segments, `..` pops the previous segment.
pub fn join_path(base: &str, segment: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in base.split('/').chain(segment.split('/')) {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            part => parts.push(part),
        }
    }
    format!("/{}", parts.join("/"))
}
