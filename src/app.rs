//! EywaApp builder: resolves convention controllers into a served router.
//!
//! Controllers are walked once, at [`EywaApp::build`], producing the route
//! table, the metadata table and the OpenAPI document derived from it.

use std::{fmt, path::PathBuf, sync::Arc};

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;
use utoipa::openapi::{Info, InfoBuilder, OpenApi};

use crate::{
    Result,
    config::{AutoRouteSettings, DEFAULT_BIND_ADDRESS},
    error::AppError,
    handler::Middleware,
    health::HealthController,
    metadata::ApiRoutes,
    middleware,
    naming::{HttpVerb, NamingRule, PrefixRule, PrefixRules},
    openapi,
    resolver::{Resolver, ResolverSettings},
    route::RouteGroup,
    traits::Controller,
};

/// Builder for convention-routed applications.
///
/// # Example
/// ```ignore
/// use eywa_autoroute::prelude::*;
///
/// EywaApp::new()
///     .info("My API", "1.0.0", "API description")
///     .base_path("/api")
///     .request_context()
///     .controller(Widget::default())
///     .health_checks()
///     .bind_address("0.0.0.0:8080")
///     .run()
///     .await?;
/// ```
pub struct EywaApp {
    controllers: Vec<Arc<dyn Controller>>,
    base_path: String,
    bind_address: String,
    middlewares: Vec<Middleware>,
    prefixes: PrefixRules,
    naming: NamingRule,
    info: Info,
    openapi_yaml: Option<PathBuf>,
    docs: bool,
    has_request_context: bool,
    has_request_logging: bool,
    has_health_checks: bool,
}

/// Everything [`EywaApp::build`] produces.
pub struct BuiltApp {
    pub router: Router,
    /// Every registered `(verb, path)`, in resolution order.
    pub registrations: Vec<(HttpVerb, String)>,
    pub api_routes: ApiRoutes,
    pub openapi: OpenApi,
}

impl fmt::Debug for BuiltApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltApp")
            .field("registrations", &self.registrations)
            .field("api_routes", &self.api_routes)
            .finish_non_exhaustive()
    }
}

impl Default for EywaApp {
    fn default() -> Self {
        Self::new()
    }
}

impl EywaApp {
    pub fn new() -> Self {
        Self {
            controllers: Vec::new(),
            base_path: "/".to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            middlewares: Vec::new(),
            prefixes: PrefixRules::default(),
            naming: NamingRule::default(),
            info: openapi::info("API", "1.0.0"),
            openapi_yaml: None,
            docs: false,
            has_request_context: false,
            has_request_logging: false,
            has_health_checks: false,
        }
    }

    /// Set API info (title, version, description).
    pub fn info(
        mut self,
        title: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.info = InfoBuilder::new()
            .title(title)
            .version(version)
            .description(Some(description))
            .build();
        self
    }

    /// Mount a controller at the global base path.
    pub fn controller<C: Controller>(mut self, controller: C) -> Self {
        self.controllers.push(Arc::new(controller));
        self
    }

    /// Mount already shared controllers, in order.
    pub fn controllers(mut self, controllers: impl IntoIterator<Item = Arc<dyn Controller>>) -> Self {
        self.controllers.extend(controllers);
        self
    }

    /// Prefix every controller route with `base_path`.
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Address [`EywaApp::run`] listens on.
    pub fn bind_address(mut self, addr: impl Into<String>) -> Self {
        self.bind_address = addr.into();
        self
    }

    /// Append a middleware to the global chain. Global middlewares run first,
    /// in the order they were added.
    pub fn middleware(mut self, middleware: Middleware) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Replace the prefix table.
    pub fn prefixes(mut self, rules: impl IntoIterator<Item = PrefixRule>) -> Self {
        self.prefixes = PrefixRules::new(rules);
        self
    }

    /// Add rules after the current prefix table.
    pub fn append_prefixes(mut self, rules: impl IntoIterator<Item = PrefixRule>) -> Self {
        self.prefixes.append(rules);
        self
    }

    /// Replace the identifier-to-segment rule.
    pub fn naming_rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.naming = NamingRule::new(rule);
        self
    }

    /// Apply loaded [`AutoRouteSettings`].
    pub fn settings(mut self, settings: &AutoRouteSettings) -> Self {
        self.base_path = settings.base_path.clone();
        self.bind_address = settings.bind_address.clone();
        self.prefixes = settings.prefix_rules();
        self.docs = settings.docs;
        self.openapi_yaml = settings.openapi_yaml.clone();
        self
    }

    /// Serve the Scalar UI at `/scalar`.
    pub fn docs(mut self) -> Self {
        self.docs = true;
        self
    }

    /// Write the OpenAPI document as YAML to `path` on build.
    pub fn openapi_yaml(mut self, path: impl Into<PathBuf>) -> Self {
        self.openapi_yaml = Some(path.into());
        self
    }

    /// Add `/health/live` and `/health/ready`, outside the base path.
    pub fn health_checks(mut self) -> Self {
        self.has_health_checks = true;
        self
    }

    /// Enable request context propagation (correlation ID, language).
    ///
    /// The context middleware runs ahead of every other global middleware.
    pub fn request_context(mut self) -> Self {
        self.has_request_context = true;
        self
    }

    /// Enable structured request logging.
    pub fn request_logging(mut self) -> Self {
        self.has_request_logging = true;
        self
    }

    /// Resolve every controller and assemble the router.
    pub fn build(self) -> Result<BuiltApp> {
        let mut global = Vec::with_capacity(self.middlewares.len() + 1);
        if self.has_request_context {
            global.push(middleware::request_context());
        }
        global.extend(self.middlewares);

        let mut resolver = Resolver::new(ResolverSettings {
            naming: self.naming,
            prefixes: self.prefixes,
        });

        let mut top = RouteGroup::root("/", global);
        let app_group = top.group(&self.base_path, Vec::new());
        for controller in self.controllers {
            resolver.resolve(app_group, controller, false);
        }
        if self.has_health_checks {
            resolver.resolve(&mut top, Arc::new(HealthController), false);
        }

        let api_routes = resolver.finish();
        let registrations = top.registrations();
        let mut router = top.into_router();

        let openapi = openapi::document(self.info, &api_routes);
        if let Some(path) = &self.openapi_yaml {
            openapi::write_yaml(&openapi, path)?;
        }

        #[cfg(feature = "scalar")]
        if self.docs {
            use utoipa_scalar::{Scalar, Servable};
            router = router.merge(Scalar::with_url("/scalar", openapi.clone()));
        }

        if self.has_request_logging {
            router = router.layer(middleware::request_logging_middleware());
        }

        info!(
            "📚 API: {} v{} ({} routes)",
            openapi.info.title,
            openapi.info.version,
            registrations.len()
        );

        Ok(BuiltApp {
            router,
            registrations,
            api_routes,
            openapi,
        })
    }

    /// Build and serve on the configured bind address.
    pub async fn run(self) -> Result<()> {
        let addr = self.bind_address.clone();
        self.serve(&addr).await
    }

    /// Build and serve on `addr`.
    pub async fn serve(self, addr: &str) -> Result<()> {
        let docs = self.docs;
        let has_health_checks = self.has_health_checks;
        let built = self.build()?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        info!("🚀 Server listening on http://{}", addr);
        if docs {
            info!("   - Scalar: http://{}/scalar", addr);
        }
        if has_health_checks {
            info!("   - Health Checks: http://{}/health/live", addr);
        }

        axum::serve(listener, built.router.into_make_service())
            .await
            .map_err(|e: std::io::Error| AppError::InternalServerError(e.to_string()))
    }
}
