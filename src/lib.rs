//! # eywa-autoroute
//!
//! Convention-based routing for EYWA Axum services: controllers are plain
//! structs, and their public methods become routes by name.
//!
//! ## Features
//!
//! - **Naming conventions**: `GetDetail` on `Widget` becomes `GET /widget/detail`
//! - **Controller trees**: `#[mount]` fields nest controllers, `#[mount(embed)]`
//!   fields promote their methods into the embedding controller
//! - **Typed callbacks**: `async fn(&self, ctx, req) -> Result<Resp>` methods are
//!   bound from path, query and JSON body automatically
//! - **Middleware chains**: global, per-controller and per-method
//! - **Route metadata**: a structural description of every request and response
//!   model, exported as OpenAPI and served through Scalar
//! - **Health Checks**: Kubernetes-ready liveness and readiness probes
//! - **Request Context**: Correlation ID and language propagation
//!
//! ## Quick Start
//!
//! ```ignore
//! use eywa_autoroute::prelude::*;
//!
//! #[derive(Debug, Deserialize, Introspect)]
//! pub struct DetailRequest {
//!     #[tag(path = "id")]
//!     pub id: u64,
//! }
//!
//! #[derive(Debug, Serialize, Introspect)]
//! pub struct Detail {
//!     pub id: u64,
//! }
//!
//! #[derive(Default, Controller)]
//! pub struct Widget;
//!
//! #[controller]
//! impl Widget {
//!     pub async fn get_detail(&self, _ctx: RequestContext, req: DetailRequest) -> Result<Detail> {
//!         Ok(Detail { id: req.id })
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     EywaApp::new()
//!         .request_context()
//!         .controller(Widget)
//!         .health_checks()
//!         .serve("0.0.0.0:8080")
//!         .await
//! }
//! ```

extern crate self as eywa_autoroute;

mod app;
pub mod classify;
pub mod config;
pub mod error;
pub mod handler;
mod health;
pub mod introspect;
pub mod metadata;
pub mod middleware;
pub mod naming;
pub mod openapi;
pub mod resolver;
pub mod route;
pub mod telemetry;
mod traits;

pub use app::{BuiltApp, EywaApp};
pub use classify::{Classified, MethodDescriptor, MethodShape};
pub use error::{AppError, Result};
pub use handler::{CallbackRoute, Handler, Middleware};
pub use introspect::{FieldInfo, Introspect, StructField, Tag, TypeDesc, introspect};
pub use metadata::{ApiRoute, ApiRoutes};
pub use naming::{HttpVerb, NamingRule, PrefixRule, PrefixRules};
pub use route::RouteGroup;
pub use traits::*;

// Re-export health check types
pub use health::{HealthController, HealthRequest, HealthResponse, HealthStatus};

// Re-export middleware types
pub use middleware::{RequestContext, request_context_middleware_fn};

// Re-export macros from eywa-autoroute-macros
pub use eywa_autoroute_macros::{Controller, Introspect, controller};

// Re-export common dependencies
pub use axum::{
    self,
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
pub use serde::{Deserialize, Serialize};
pub use serde_json::{self, json};
pub use tokio;
pub use tracing::{debug, error, info, instrument, warn};

/// Prelude for easy importing
pub mod prelude {
    pub use super::{
        AppError, Controller, Deserialize, EywaApp, Handler, HealthController, HttpVerb,
        Introspect, IntoResponse, Middleware, Next, PrefixRule, Request, RequestContext,
        Response, Result, Serialize, controller, debug, error, info, json, warn,
    };
    pub use crate::config::{AutoRouteSettings, EywaConfig};
    pub use uuid::Uuid;
}
