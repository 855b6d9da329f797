//! Chain elements shipped with the crate: the request context that every
//! convention callback receives, and HTTP access logging.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::handler::Middleware;

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";
pub const LANGUAGE_HEADER: &str = "accept-language";
const DEFAULT_LANGUAGE: &str = "en";

/// Per-request metadata, passed as the first argument of every callback.
///
/// The generated handler takes it from the request extensions. When the
/// context middleware is not installed a fresh default is used instead.
///
/// ```ignore
/// use eywa_autoroute::prelude::*;
///
/// #[controller]
/// impl Widget {
///     pub async fn get_detail(&self, ctx: RequestContext, req: DetailRequest) -> Result<Detail> {
///         info!(correlation_id = %ctx.correlation_id, "loading widget");
///         Ok(Detail::find(req.id)?)
///     }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Taken from `X-Correlation-ID` when it holds a UUID, generated otherwise.
    pub correlation_id: Uuid,
    /// Raw `Accept-Language` value, `"en"` when absent.
    pub language: String,
    /// Always freshly generated.
    pub request_id: Uuid,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            language: DEFAULT_LANGUAGE.to_string(),
            request_id: Uuid::new_v4(),
        }
    }
}

impl RequestContext {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            correlation_id: extract_correlation_id(headers),
            language: extract_language(headers),
            request_id: Uuid::new_v4(),
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn extract_correlation_id(headers: &HeaderMap) -> Uuid {
    header_str(headers, CORRELATION_ID_HEADER)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .unwrap_or_else(Uuid::new_v4)
}

fn extract_language(headers: &HeaderMap) -> String {
    header_str(headers, LANGUAGE_HEADER)
        .unwrap_or(DEFAULT_LANGUAGE)
        .to_string()
}

/// Stores a [`RequestContext`] in the request extensions and echoes the
/// correlation id on the response.
pub async fn request_context_middleware_fn(mut req: Request, next: Next) -> Response {
    let ctx = RequestContext::from_headers(req.headers());
    let correlation_id = ctx.correlation_id.to_string();
    req.extensions_mut().insert(ctx);

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }
    response
}

/// The context middleware as a chain element. `EywaApp` puts it first in
/// the global chain.
pub fn request_context() -> Middleware {
    Middleware::from_fn(request_context_middleware_fn)
}

/// Access log layer: one `INFO` event per response with status and latency
/// in milliseconds.
pub fn request_logging_middleware() -> tower_http::trace::TraceLayer<
    tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>,
> {
    tower_http::trace::TraceLayer::new_for_http()
        .on_response(
            tower_http::trace::DefaultOnResponse::new()
                .level(tracing::Level::INFO)
                .latency_unit(tower_http::LatencyUnit::Millis),
        )
        .on_failure(tower_http::trace::DefaultOnFailure::new().level(tracing::Level::WARN))
}

#[cfg(test)]
mod tests {
    use axum::{Extension, Router, body::Body, routing::get};
    use tower::ServiceExt;

    use super::*;

    #[test]
    fn test_context_from_headers() {
        let correlation_id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            CORRELATION_ID_HEADER,
            HeaderValue::from_str(&correlation_id.to_string()).unwrap(),
        );
        headers.insert(LANGUAGE_HEADER, HeaderValue::from_static("it-IT"));

        let ctx = RequestContext::from_headers(&headers);
        assert_eq!(ctx.correlation_id, correlation_id);
        assert_eq!(ctx.language, "it-IT");
        assert_ne!(ctx.request_id, correlation_id);
    }

    #[test]
    fn test_context_defaults() {
        let mut headers = HeaderMap::new();
        headers.insert(CORRELATION_ID_HEADER, HeaderValue::from_static("not-a-uuid"));

        let ctx = RequestContext::from_headers(&headers);
        assert_eq!(ctx.correlation_id.get_version(), Some(uuid::Version::Random));
        assert_eq!(ctx.language, "en");
    }

    #[tokio::test]
    async fn test_context_reaches_handler_and_echoes_header() {
        let app = Router::new()
            .route(
                "/",
                get(|Extension(ctx): Extension<RequestContext>| async move { ctx.language }),
            )
            .layer(axum::middleware::from_fn(request_context_middleware_fn));

        let correlation_id = Uuid::new_v4();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("x-correlation-id", correlation_id.to_string())
                    .header("accept-language", "de")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()["x-correlation-id"],
            correlation_id.to_string().as_str()
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"de");
    }
}
