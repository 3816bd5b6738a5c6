/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router
/// with all routes and middleware.
use crate::{
    config::Config,
    mailer::Mailer,
    middleware::security::security_headers,
};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskmaster_shared::auth::{middleware as auth_middleware, revocation::RevocationStore};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned per request via Axum's `State` extractor; the heavyweight
/// members are behind `Arc` or internally pooled.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Refresh-token revocation list
    pub revocation: Arc<dyn RevocationStore>,

    /// Outgoing mail delivery
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Creates new application state
    pub fn new(
        db: PgPool,
        config: Config,
        revocation: Arc<dyn RevocationStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            db,
            config: Arc::new(config),
            revocation,
            mailer,
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Liveness + DB check (public)
/// ├── /user/
/// │   ├── POST /create               # Registration (public)
/// │   ├── POST /login                # Login (public)
/// │   ├── POST /forgot-password      # Request reset link (public)
/// │   ├── POST /reset-password       # Consume reset token (public)
/// │   ├── POST /logout               # Revoke refresh token (auth)
/// │   ├── POST /change-password      # (auth)
/// │   └── POST /profile/update-info  # (auth)
/// ├── /auth/
/// │   └── POST /refresh-token        # Exchange refresh for access (public)
/// ├── /category/...                  # Category CRUD (auth)
/// └── /task/...                      # Task CRUD + search (auth)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Authentication (per-route-group basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public user routes (no auth)
    let user_public_routes = Router::new()
        .route("/create", post(routes::users::create_user))
        .route("/login", post(routes::users::login))
        .route("/forgot-password", post(routes::users::forgot_password))
        .route("/reset-password", post(routes::users::reset_password));

    // Authenticated user routes
    let user_authed_routes = Router::new()
        .route("/logout", post(routes::users::logout))
        .route("/change-password", post(routes::users::change_password))
        .route("/profile/update-info", post(routes::users::update_profile))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Refresh-token exchange (authenticates via the refresh token itself)
    let auth_routes = Router::new().route("/refresh-token", post(routes::auth::refresh_token));

    // Category routes (require JWT authentication); the static /list
    // segment takes precedence over the /:id capture
    let category_routes = Router::new()
        .route("/create", post(routes::categories::create_category))
        .route("/edit", post(routes::categories::edit_category))
        .route("/delete", post(routes::categories::delete_category))
        .route("/list", get(routes::categories::list_categories))
        .route("/:id", get(routes::categories::get_category))
        .route("/:id/tasks", get(routes::categories::list_category_tasks))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Task routes (require JWT authentication)
    let task_routes = Router::new()
        .route("/create", post(routes::tasks::create_task))
        .route("/edit", post(routes::tasks::edit_task))
        .route("/delete", post(routes::tasks::delete_task))
        .route("/search/:term", get(routes::tasks::search_tasks))
        .route("/:id", get(routes::tasks::get_task))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let user_routes = user_public_routes.merge(user_authed_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    let production = state.config.api.production;

    Router::new()
        .merge(health_routes)
        .nest("/user", user_routes)
        .nest("/auth", auth_routes)
        .nest("/category", category_routes)
        .nest("/task", task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(axum::middleware::from_fn(move |req, next| {
            security_headers(req, next, production)
        }))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Validates the Bearer access token and injects an `AuthContext` into
/// request extensions for handlers to extract.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_context = auth_middleware::authenticate_request(req.headers(), state.jwt_secret())?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
