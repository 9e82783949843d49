//! Request ID middleware and request span construction.
//!
//! Every request gets an ID: the one forwarded by the gateway in
//! `x-request-id`, or a fresh UUID v4. The ID is recorded on the request
//! span, tagged on the Sentry scope and echoed back in the response headers
//! so cart mutations can be correlated across the gateway and the store.

use axum::{
    extract::Request,
    http::{HeaderValue, Request as HttpRequest},
    middleware::Next,
    response::Response,
};
use tracing::{Span, field::Empty};
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the span `TraceLayer` opens for each request.
///
/// `request_id` and `user_id` are declared empty so the request-id
/// middleware and the auth extractors can fill them in later.
pub fn make_request_span<B>(request: &HttpRequest<B>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = Empty,
        user_id = Empty,
    )
}

/// Pick the forwarded request ID if it is usable, otherwise generate one.
fn resolve_request_id(request: &Request) -> String {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from)
}

/// Middleware that ensures every request has a unique request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = resolve_request_id(&request);

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;

    use super::*;

    #[test]
    fn test_forwarded_request_id_is_kept() {
        let request = Request::builder()
            .header(REQUEST_ID_HEADER, "gateway-abc-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(resolve_request_id(&request), "gateway-abc-123");
    }

    #[test]
    fn test_missing_or_blank_request_id_is_generated() {
        let request = Request::builder().body(Body::empty()).unwrap();
        let generated = resolve_request_id(&request);
        assert!(Uuid::parse_str(&generated).is_ok());

        let request = Request::builder()
            .header(REQUEST_ID_HEADER, "   ")
            .body(Body::empty())
            .unwrap();
        assert!(Uuid::parse_str(&resolve_request_id(&request)).is_ok());
    }
}
