//! Metadata collected for every convention-callback route, for consumption
//! by documentation generators.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::introspect::FieldInfo;

/// A request or response model and its field tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub info: Vec<FieldInfo>,
}

/// One convention-callback route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRoute {
    pub path: String,
    /// Lower-case verb, e.g. `"get"`.
    pub http_method: String,
    pub method_name: String,
    pub req_params: Field,
    pub resp_params: Field,
}

/// Route metadata keyed by final path. Iteration order is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiRoutes(BTreeMap<String, Vec<ApiRoute>>);

impl ApiRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record under its path.
    pub fn push(&mut self, route: ApiRoute) {
        self.0.entry(route.path.clone()).or_default().push(route);
    }

    pub fn get(&self, path: &str) -> Option<&[ApiRoute]> {
        self.0.get(path).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ApiRoute])> {
        self.0.iter().map(|(path, routes)| (path.as_str(), routes.as_slice()))
    }

    /// Number of records across all paths.
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
