//! The resolved route tree and its binding onto an axum [`Router`].
//!
//! Resolution produces plain data: nested [`RouteGroup`]s mirroring the
//! controller tree, each carrying its own middleware chain and the routes
//! registered directly under it. [`RouteGroup::into_router`] folds the tree
//! into a router, layering every group chain once over the whole group.

use axum::Router;

use crate::{
    handler::{self, Handler, Middleware},
    naming::{HttpVerb, join_path},
};

/// One resolved route.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    pub verb: HttpVerb,
    /// Absolute path, with `:name` placeholders.
    pub path: String,
    pub method_name: String,
    /// Method-level chain, run after the group chains.
    pub middlewares: Vec<Middleware>,
    pub handler: Handler,
}

/// A path scope with its own middleware chain.
#[derive(Debug, Clone, Default)]
pub struct RouteGroup {
    /// Absolute path of the scope.
    pub path: String,
    pub middlewares: Vec<Middleware>,
    pub routes: Vec<RouteDescriptor>,
    pub groups: Vec<RouteGroup>,
}

impl RouteGroup {
    pub fn root(path: &str, middlewares: Vec<Middleware>) -> Self {
        Self {
            path: join_path("/", path),
            middlewares,
            ..Self::default()
        }
    }

    /// Opens a sub-group at `self.path + path`.
    pub fn group(&mut self, path: &str, middlewares: Vec<Middleware>) -> &mut RouteGroup {
        let index = self.groups.len();
        self.groups.push(Self {
            path: join_path(&self.path, path),
            middlewares,
            ..Self::default()
        });
        &mut self.groups[index]
    }

    /// Registers a route at `self.path + path`.
    pub fn handle(
        &mut self,
        verb: HttpVerb,
        path: &str,
        method_name: impl Into<String>,
        middlewares: Vec<Middleware>,
        handler: Handler,
    ) {
        self.routes.push(RouteDescriptor {
            verb,
            path: join_path(&self.path, path),
            method_name: method_name.into(),
            middlewares,
            handler,
        });
    }

    /// Every `(verb, path)` registered in this subtree, depth first.
    pub fn registrations(&self) -> Vec<(HttpVerb, String)> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect(&self, out: &mut Vec<(HttpVerb, String)>) {
        out.extend(self.routes.iter().map(|r| (r.verb, r.path.clone())));
        for group in &self.groups {
            group.collect(out);
        }
    }

    /// Folds the tree into a router.
    pub fn into_router(self) -> Router {
        let mut router = Router::new();
        for route in self.routes {
            let method_router = handler::wrap_method(
                route.handler.into_method_router(route.verb),
                &route.middlewares,
            );
            router = router.route(&axum_path(&route.path), method_router);
        }
        for group in self.groups {
            router = router.merge(group.into_router());
        }
        handler::wrap_router(router, &self.middlewares)
    }
}

/// Rewrites `:name` placeholders into the router's `{name}` syntax.
pub fn axum_path(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{name}}}"),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// The path with every `:name` placeholder reduced to `:`. Two paths with the
/// same shape but different placeholder names cannot share a router.
pub fn path_shape(path: &str) -> String {
    path.split('/')
        .map(|segment| if segment.starts_with(':') { ":" } else { segment })
        .collect::<Vec<_>>()
        .join("/")
}
