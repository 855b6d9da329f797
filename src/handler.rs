//! Type-erased terminal handlers, middleware and the generated handler that
//! binds convention callbacks to HTTP requests.

use std::{collections::HashMap, fmt, future::Future, pin::Pin, sync::Arc};

use axum::{
    Json, Router,
    body::{self, Body},
    extract::{FromRequestParts, Path, Query, Request},
    middleware::{self as axum_middleware, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{
    error::AppError,
    introspect::{FieldInfo, Introspect, TypeDesc},
    middleware::RequestContext,
    naming::HttpVerb,
};

/// Largest request body the generated handler buffers.
pub const BODY_LIMIT: usize = 2 * 1024 * 1024;

pub type BoxResponseFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// A terminal request handler.
#[derive(Clone)]
pub struct Handler(Arc<dyn Fn(Request) -> BoxResponseFuture + Send + Sync>);

impl Handler {
    pub fn new<F, Fut, R>(handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        Self(Arc::new(move |req| -> BoxResponseFuture {
            let fut = handler(req);
            Box::pin(async move { fut.await.into_response() })
        }))
    }

    /// Wraps any axum handler (`async fn` with extractors).
    pub fn from_axum<H, T>(handler: H) -> Self
    where
        H: axum::handler::Handler<T, ()>,
        T: 'static,
    {
        Self::new(move |req| handler.clone().call(req, ()))
    }

    pub fn call(&self, req: Request) -> BoxResponseFuture {
        (self.0)(req)
    }

    pub(crate) fn into_method_router(self, verb: HttpVerb) -> MethodRouter {
        axum::routing::on(verb.method_filter(), move |req: Request| self.call(req))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}

/// One cross-cutting handler in a chain. Calls `next.run(req)` to continue.
#[derive(Clone)]
pub struct Middleware(Arc<dyn Fn(Request, Next) -> BoxResponseFuture + Send + Sync>);

impl Middleware {
    pub fn from_fn<F, Fut, R>(middleware: F) -> Self
    where
        F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        Self(Arc::new(move |req, next| -> BoxResponseFuture {
            let fut = middleware(req, next);
            Box::pin(async move { fut.await.into_response() })
        }))
    }

    fn as_fn(&self) -> impl Fn(Request, Next) -> BoxResponseFuture + Clone + Send + Sync + 'static {
        let inner = Arc::clone(&self.0);
        move |req: Request, next: Next| inner(req, next)
    }

    pub(crate) fn wrap_router(&self, router: Router) -> Router {
        router.layer(axum_middleware::from_fn(self.as_fn()))
    }

    pub(crate) fn wrap_method(&self, route: MethodRouter) -> MethodRouter {
        route.layer(axum_middleware::from_fn(self.as_fn()))
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Middleware(..)")
    }
}

/// Applies a chain so that its first element runs first.
pub(crate) fn wrap_router(router: Router, chain: &[Middleware]) -> Router {
    chain.iter().rev().fold(router, |router, mw| mw.wrap_router(router))
}

pub(crate) fn wrap_method(route: MethodRouter, chain: &[Middleware]) -> MethodRouter {
    chain.iter().rev().fold(route, |route, mw| mw.wrap_method(route))
}

type Invoke = Arc<dyn Fn(RequestContext, Value) -> BoxResponseFuture + Send + Sync>;

/// A `(ctx, Request) -> Result<Response, E>` method, erased.
#[derive(Clone)]
pub struct CallbackRoute {
    pub request: TypeDesc,
    pub response: TypeDesc,
    invoke: Invoke,
}

impl CallbackRoute {
    pub fn new<C, Req, Resp, E, F, Fut>(controller: Arc<C>, method: F) -> Self
    where
        C: Send + Sync + 'static,
        F: Fn(Arc<C>, RequestContext, Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Resp, E>> + Send + 'static,
        Req: DeserializeOwned + Introspect + Send + 'static,
        Resp: Serialize + Introspect + Send + 'static,
        E: IntoResponse + Send + 'static,
    {
        let invoke: Invoke = Arc::new(move |ctx, value| -> BoxResponseFuture {
            let request = match serde_json::from_value::<Req>(value) {
                Ok(request) => request,
                Err(err) => {
                    let rejection = AppError::BadRequest(err.to_string());
                    return Box::pin(async move { rejection.into_response() });
                }
            };
            let fut = method(Arc::clone(&controller), ctx, request);
            Box::pin(async move {
                match fut.await {
                    Ok(resp) => Json(resp).into_response(),
                    Err(err) => err.into_response(),
                }
            })
        });

        Self {
            request: Req::describe(),
            response: Resp::describe(),
            invoke,
        }
    }

    /// Builds the terminal handler: binds the request model, forwards the
    /// context and renders the outcome.
    pub fn into_handler(self, verb: HttpVerb, fields: Vec<FieldInfo>) -> Handler {
        let fields = Arc::new(fields);
        let invoke = self.invoke;
        Handler(Arc::new(move |req| -> BoxResponseFuture {
            let fields = Arc::clone(&fields);
            let invoke = Arc::clone(&invoke);
            Box::pin(async move {
                match bind(req, verb, &fields).await {
                    Ok((ctx, value)) => invoke(ctx, value).await,
                    Err(err) => err.into_response(),
                }
            })
        }))
    }
}

impl fmt::Debug for CallbackRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRoute")
            .field("request", &self.request.name)
            .field("response", &self.response.name)
            .finish_non_exhaustive()
    }
}

/// Collects path, query and body values into one JSON object keyed the way
/// the request model deserializes.
async fn bind(
    req: Request,
    verb: HttpVerb,
    fields: &[FieldInfo],
) -> Result<(RequestContext, Value), AppError> {
    let (mut parts, body) = req.into_parts();
    let ctx = parts
        .extensions
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_default();

    let path_params = Path::<HashMap<String, String>>::from_request_parts(&mut parts, &())
        .await
        .map(|Path(params)| params)
        .unwrap_or_default();
    let Query(query_params) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .map_err(|err| AppError::BadRequest(err.body_text()))?;

    let mut object = if verb.is_bodyless() {
        Map::new()
    } else {
        read_body(body).await?
    };

    for field in fields {
        if let Some(raw) = field.tags.path_param().and_then(|key| path_params.get(key)) {
            object.insert(field.wire_name().to_string(), coerce(raw, field));
        }
        if let Some(raw) = field.tags.query_param().and_then(|key| query_params.get(key)) {
            object.insert(field.wire_name().to_string(), coerce(raw, field));
        }
    }

    Ok((ctx, Value::Object(object)))
}

async fn read_body(body: Body) -> Result<Map<String, Value>, AppError> {
    let bytes = body::to_bytes(body, BODY_LIMIT)
        .await
        .map_err(|err| AppError::BadRequest(err.to_string()))?;
    if bytes.is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(&bytes)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(AppError::BadRequest(
            "request body must be a JSON object".to_string(),
        )),
    }
}

/// Path and query values arrive as text. They are parsed by the declared
/// scalar type and otherwise passed on as strings.
fn coerce(raw: &str, field: &FieldInfo) -> Value {
    let parsed = match field.child_type.as_str() {
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" => {
            raw.parse::<i64>().ok().map(Value::from)
        }
        "u8" | "u16" | "u32" | "u64" | "u128" | "usize" => {
            raw.parse::<u64>().ok().map(Value::from)
        }
        "f32" | "f64" => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        "bool" => raw.parse::<bool>().ok().map(Value::Bool),
        _ => None,
    };
    parsed.unwrap_or_else(|| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use rstest::rstest;

    use super::*;
    use crate::introspect::Tag;

    fn field(name: &str, child_type: &str) -> FieldInfo {
        FieldInfo {
            type_name: child_type.to_string(),
            name: name.to_string(),
            tags: Tag::default(),
            child_type: child_type.to_string(),
            info: Vec::new(),
            recursive: false,
        }
    }

    #[rstest]
    #[case("42", "u32", Value::from(42))]
    #[case("007", "u64", Value::from(7))]
    #[case("+5", "u8", Value::from(5))]
    #[case("-3", "i32", Value::from(-3))]
    #[case("1.", "f64", Value::from(1.0))]
    #[case("2.5", "f32", Value::from(2.5))]
    #[case("true", "bool", Value::Bool(true))]
    #[case("42", "String", Value::from("42"))]
    #[case("007", "Status", Value::from("007"))]
    #[case("abc", "u32", Value::from("abc"))]
    #[case("-1", "u32", Value::from("-1"))]
    fn test_coerce(#[case] raw: &str, #[case] child_type: &str, #[case] expected: Value) {
        assert_eq!(coerce(raw, &field("value", child_type)), expected);
    }

    #[tokio::test]
    async fn test_bind_uses_body_key() {
        let mut id = field("id", "u64");
        id.tags.query_key = "id".into();
        id.tags.body_key = "widgetId".into();

        let req = Request::builder()
            .uri("/widget?id=9")
            .body(Body::empty())
            .unwrap();

        let (_, value) = bind(req, HttpVerb::Get, &[id]).await.unwrap();
        assert_eq!(value, serde_json::json!({ "widgetId": 9 }));
    }

    #[tokio::test]
    async fn test_from_axum_handler() {
        let handler = Handler::from_axum(|Query(params): Query<HashMap<String, String>>| async move {
            format!("hello {}", params.get("name").map_or("anonymous", String::as_str))
        });

        let req = Request::builder()
            .uri("/hello?name=ada")
            .body(Body::empty())
            .unwrap();
        let response = handler.call(req).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"hello ada");
    }

    #[tokio::test]
    async fn test_bind_merges_query_and_body() {
        let mut page = field("current", "i32");
        page.tags.query_key = "current".into();
        let name = field("name", "String");

        let req = Request::builder()
            .method("POST")
            .uri("/widget/list?current=3&ignored=1")
            .body(Body::from(r#"{"name":"demo"}"#))
            .unwrap();

        let (ctx, value) = bind(req, HttpVerb::Post, &[page, name]).await.unwrap();
        assert_eq!(ctx.language, "en");
        assert_eq!(value, serde_json::json!({ "current": 3, "name": "demo" }));
    }

    #[tokio::test]
    async fn test_bind_rejects_non_object_body() {
        let req = Request::builder()
            .method("PUT")
            .uri("/widget")
            .body(Body::from("[1, 2]"))
            .unwrap();

        let err = bind(req, HttpVerb::Put, &[]).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_ignores_body() {
        let req = Request::builder()
            .method("GET")
            .uri("/widget")
            .body(Body::from("not json"))
            .unwrap();

        let (_, value) = bind(req, HttpVerb::Get, &[]).await.unwrap();
        assert_eq!(value, serde_json::json!({}));
    }
}
