/// Security response headers
///
/// Every response carries a small set of hardening headers. This is a
/// JSON API with no embedded scripts or frames, so the set is minimal:
/// a locked-down CSP, sniffing and framing protection, and a
/// no-referrer policy. HSTS is added only when the server runs behind
/// HTTPS (production mode).
use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Headers applied to every response
const BASE_HEADERS: [(HeaderName, HeaderValue); 5] = [
    (
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    ),
    (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
    (
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    ),
    (
        header::REFERRER_POLICY,
        HeaderValue::from_static("no-referrer"),
    ),
    (
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
    ),
];

const HSTS_VALUE: HeaderValue = HeaderValue::from_static("max-age=31536000; includeSubDomains");

/// Middleware adding the security headers to the response
///
/// Wire up with `axum::middleware::from_fn`, closing over the
/// production flag:
///
/// ```no_run
/// use axum::{middleware, Router};
/// use taskmaster_api::middleware::security::security_headers;
///
/// let production = false;
/// let app: Router = Router::new()
///     .layer(middleware::from_fn(move |req, next| {
///         security_headers(req, next, production)
///     }));
/// ```
pub async fn security_headers(request: Request, next: Next, enable_hsts: bool) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    for (name, value) in BASE_HEADERS {
        headers.insert(name, value);
    }

    if enable_hsts {
        headers.insert(header::STRICT_TRANSPORT_SECURITY, HSTS_VALUE);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use tower::Service as _;

    fn app(production: bool) -> Router {
        Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(middleware::from_fn(move |req, next| {
                security_headers(req, next, production)
            }))
    }

    async fn get_ping(production: bool) -> Response {
        app(production)
            .call(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_base_headers_on_every_response() {
        let response = get_ping(false).await;
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers();
        for (name, value) in BASE_HEADERS {
            assert_eq!(headers.get(&name), Some(&value), "missing header {}", name);
        }
    }

    #[tokio::test]
    async fn test_hsts_follows_production_flag() {
        let response = get_ping(true).await;
        assert_eq!(
            response.headers().get(header::STRICT_TRANSPORT_SECURITY),
            Some(&HSTS_VALUE)
        );

        let response = get_ping(false).await;
        assert!(response
            .headers()
            .get(header::STRICT_TRANSPORT_SECURITY)
            .is_none());
    }
}
