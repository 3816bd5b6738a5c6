/// Integration tests for the token lifecycle
///
/// These tests drive the real router via `tower::Service::call` without
/// a live database: the pool is created lazily and never connected, the
/// revocation store is in-memory, and mail is log-only. Only the
/// stateless paths are exercised:
/// - authentication requirements on protected routes
/// - refresh-token exchange
/// - logout revocation making later refreshes fail
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use taskmaster_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, DatabaseConfig, JwtConfig},
    mailer::LogMailer,
};
use taskmaster_shared::auth::{
    jwt::{create_token, Claims, TokenType},
    revocation::InMemoryRevocationStore,
};
use tower::Service as _;
use uuid::Uuid;

const SECRET: &str = "integration-test-secret-at-least-32-bytes";

fn test_app() -> Router {
    let config = Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            production: false,
        },
        database: DatabaseConfig {
            url: "postgresql://localhost/taskmaster_test_unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: SECRET.to_string(),
        },
        mail: None,
        frontend_url: "http://localhost:3000".to_string(),
    };

    // Lazy pool: never actually connects in these tests
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(&config.database.url)
        .expect("lazy pool");

    let state = AppState::new(
        pool,
        config,
        Arc::new(InMemoryRevocationStore::new()),
        Arc::new(LogMailer::new()),
    );

    build_router(state)
}

fn access_header(user_id: Uuid) -> String {
    let token = create_token(&Claims::new(user_id, TokenType::Access), SECRET).unwrap();
    format!("Bearer {}", token)
}

fn refresh_token_for(user_id: Uuid) -> String {
    create_token(&Claims::new(user_id, TokenType::Refresh), SECRET).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_protected_routes_require_authentication() {
    let mut app = test_app();

    for uri in ["/category/list", "/task/search/report"] {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        let response = app.call(request).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "expected 401 for {}",
            uri
        );
    }
}

#[tokio::test]
async fn test_malformed_authorization_header_is_bad_request() {
    let mut app = test_app();

    let request = Request::builder()
        .method("GET")
        .uri("/category/list")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_expired_access_token_rejected() {
    let mut app = test_app();

    // Only 30 seconds past expiry: freshly-dead tokens get no grace
    // window at the middleware either
    let claims = Claims::with_lifetime(
        Uuid::new_v4(),
        TokenType::Access,
        chrono::Duration::seconds(-30),
    );
    let token = create_token(&claims, SECRET).unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/category/list")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_exchange() {
    let mut app = test_app();
    let user_id = Uuid::new_v4();

    let request = Request::builder()
        .method("POST")
        .uri("/auth/refresh-token")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "refresh_token": refresh_token_for(user_id) }).to_string(),
        ))
        .unwrap();

    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["access_token"].is_string());

    // The minted token must be a usable access credential
    let access_token = body["access_token"].as_str().unwrap();
    let claims =
        taskmaster_shared::auth::jwt::validate_access_token(access_token, SECRET).unwrap();
    assert_eq!(claims.sub, user_id);
}

#[tokio::test]
async fn test_just_expired_refresh_token_rejected() {
    let mut app = test_app();

    let claims = Claims::with_lifetime(
        Uuid::new_v4(),
        TokenType::Refresh,
        chrono::Duration::seconds(-30),
    );
    let token = create_token(&claims, SECRET).unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/auth/refresh-token")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "refresh_token": token }).to_string()))
        .unwrap();

    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_access_token_rejected_as_refresh_token() {
    let mut app = test_app();

    let access = create_token(&Claims::new(Uuid::new_v4(), TokenType::Access), SECRET).unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/auth/refresh-token")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "refresh_token": access }).to_string()))
        .unwrap();

    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let mut app = test_app();
    let user_id = Uuid::new_v4();
    let refresh_token = refresh_token_for(user_id);

    // The token works before logout
    let request = Request::builder()
        .method("POST")
        .uri("/auth/refresh-token")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "refresh_token": refresh_token }).to_string(),
        ))
        .unwrap();
    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Logout revokes it
    let request = Request::builder()
        .method("POST")
        .uri("/user/logout")
        .header("authorization", access_header(user_id))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "refresh_token": refresh_token }).to_string(),
        ))
        .unwrap();
    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Subsequent refreshes fail
    let request = Request::builder()
        .method("POST")
        .uri("/auth/refresh-token")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "refresh_token": refresh_token }).to_string(),
        ))
        .unwrap();
    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_with_garbage_token_is_bad_request() {
    let mut app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/user/logout")
        .header("authorization", access_header(Uuid::new_v4()))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "refresh_token": "not.a.token" }).to_string(),
        ))
        .unwrap();

    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout_does_not_affect_other_tokens() {
    let mut app = test_app();
    let user_id = Uuid::new_v4();
    let revoked = refresh_token_for(user_id);
    let survivor = refresh_token_for(user_id);

    let request = Request::builder()
        .method("POST")
        .uri("/user/logout")
        .header("authorization", access_header(user_id))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "refresh_token": revoked }).to_string()))
        .unwrap();
    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A different refresh token from the same user still works
    let request = Request::builder()
        .method("POST")
        .uri("/auth/refresh-token")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "refresh_token": survivor }).to_string()))
        .unwrap();
    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_security_headers_present() {
    let mut app = test_app();

    let request = Request::builder()
        .method("GET")
        .uri("/category/list")
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();

    // Applied even on error responses
    assert_eq!(
        response.headers().get("X-Content-Type-Options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("X-Frame-Options").unwrap(), "DENY");
}
