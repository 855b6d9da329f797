//! Method descriptors and their classification into routable shapes.
//!
//! A descriptor table is produced once per controller (normally by the
//! `#[controller]` macro, which inspects signatures at compile time). The
//! shape tag carried by each descriptor decides how the resolver treats it.

use std::{fmt, future::Future, sync::Arc};

use axum::response::IntoResponse;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    handler::{CallbackRoute, Handler},
    introspect::Introspect,
    middleware::RequestContext,
};

type HandlerFactory = Box<dyn FnOnce() -> Handler + Send>;

/// Signature shape of one public method.
pub enum MethodShape {
    /// `fn(&self) -> Handler`: a factory for a terminal handler.
    PassThrough(HandlerFactory),
    /// `fn(&self, ctx, Request) -> Result<Response, E>`.
    Callback(CallbackRoute),
    /// Any other signature.
    NotRoutable,
}

/// One public method of a controller.
pub struct MethodDescriptor {
    pub name: String,
    pub shape: MethodShape,
}

impl MethodDescriptor {
    pub fn pass_through<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: FnOnce() -> Handler + Send + 'static,
    {
        Self {
            name: name.into(),
            shape: MethodShape::PassThrough(Box::new(factory)),
        }
    }

    pub fn callback<C, Req, Resp, E, F, Fut>(
        name: impl Into<String>,
        controller: Arc<C>,
        method: F,
    ) -> Self
    where
        C: Send + Sync + 'static,
        F: Fn(Arc<C>, RequestContext, Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Resp, E>> + Send + 'static,
        Req: DeserializeOwned + Introspect + Send + 'static,
        Resp: Serialize + Introspect + Send + 'static,
        E: IntoResponse + Send + 'static,
    {
        Self {
            name: name.into(),
            shape: MethodShape::Callback(CallbackRoute::new(controller, method)),
        }
    }

    pub fn not_routable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: MethodShape::NotRoutable,
        }
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match &self.shape {
            MethodShape::PassThrough(_) => "PassThrough",
            MethodShape::Callback(_) => "Callback",
            MethodShape::NotRoutable => "NotRoutable",
        };
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("shape", &shape)
            .finish()
    }
}

/// Result of classifying a descriptor.
#[derive(Debug)]
pub enum Classified {
    PassThrough(Handler),
    Callback(CallbackRoute),
    NotRoutable,
}

/// Classifies one method. Pass-through factories are invoked here, once.
pub fn classify(shape: MethodShape) -> Classified {
    match shape {
        MethodShape::PassThrough(factory) => Classified::PassThrough(factory()),
        MethodShape::Callback(route) => Classified::Callback(route),
        MethodShape::NotRoutable => Classified::NotRoutable,
    }
}
