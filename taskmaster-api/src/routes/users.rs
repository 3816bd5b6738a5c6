/// User account endpoints
///
/// Registration, login, logout, the password-reset flow, password
/// change, and profile updates.
///
/// # Endpoints
///
/// - `POST /user/create` - Register a new account
/// - `POST /user/login` - Login and get a token pair
/// - `POST /user/logout` - Revoke a refresh token (authenticated)
/// - `POST /user/forgot-password` - Request a reset link
/// - `POST /user/reset-password` - Consume a reset token
/// - `POST /user/change-password` - Change password (authenticated)
/// - `POST /user/profile/update-info` - Update profile (authenticated)
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use taskmaster_shared::{
    auth::{jwt, middleware::AuthContext, password, reset},
    models::user::{CreateUser, User, UserStatus},
};
use tracing::warn;
use validator::Validate;

/// Public view of a user account
///
/// Strips the password hash and reset-token state from the model.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub profile_picture: Option<String>,
    pub status: UserStatus,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            full_name: user.full_name,
            profile_picture: user.profile_picture,
            status: user.status,
        }
    }
}

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// Optional display name
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub full_name: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Access token (15 min)
    pub access_token: String,

    /// Refresh token (7 days)
    pub refresh_token: String,

    /// The authenticated user
    pub user: UserResponse,
}

/// Logout request
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    /// The refresh token to revoke
    pub refresh_token: String,
}

/// Forgot-password request
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Reset-password request
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    /// The token from the reset link
    pub token: String,

    /// The new password
    #[validate(length(min = 1, message = "Password is required"))]
    pub new_password: String,
}

/// Change-password request
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// The current password, verified before the change
    pub current_password: String,

    /// The new password
    #[validate(length(min = 1, message = "Password is required"))]
    pub new_password: String,
}

/// Profile-update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub full_name: Option<String>,

    #[validate(length(max = 512, message = "Picture URL must be at most 512 characters"))]
    pub profile_picture: Option<String>,
}

/// Generic acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Register a new user
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `409 Conflict`: Email already registered
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    req.validate().map_err(ApiError::from_validation)?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_hash,
            full_name: req.full_name,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Login
///
/// Verifies credentials and mints an access/refresh token pair. The
/// failure message is identical for an unknown email, a wrong password,
/// and a non-active account.
///
/// # Errors
///
/// - `400 Bad Request`: Invalid credentials
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()
        .map_err(|_| ApiError::BadRequest("Invalid email or password".to_string()))?;

    let invalid = || ApiError::BadRequest("Invalid email or password".to_string());

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(invalid());
    }

    if user.status != UserStatus::Active {
        return Err(invalid());
    }

    let access_claims = jwt::Claims::new(user.id, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok(Json(LoginResponse {
        access_token,
        refresh_token,
        user: user.into(),
    }))
}

/// Logout
///
/// Revokes the presented refresh token by recording its `jti` until the
/// token's natural expiry. The access token used to authenticate this
/// request stays valid for the remainder of its 15-minute lifetime.
///
/// # Errors
///
/// - `400 Bad Request`: The refresh token is invalid or expired
pub async fn logout(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Json(req): Json<LogoutRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())
        .map_err(|_| ApiError::BadRequest("Invalid token".to_string()))?;

    state.revocation.revoke(claims.jti, claims.expires_at()).await?;

    Ok(Json(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

/// Request a password-reset link
///
/// Always answers with the same generic acknowledgement so the response
/// does not reveal whether the email is registered. When the account
/// exists, a fresh token is stored and a reset link dispatched; if
/// dispatch fails the token is cleared again and a generic internal
/// error is returned.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let ack = || {
        Json(MessageResponse {
            message: "If the email is registered, a reset link has been sent".to_string(),
        })
    };

    if req.validate().is_err() {
        return Ok(ack());
    }

    let Some(user) = User::find_by_email(&state.db, &req.email).await? else {
        return Ok(ack());
    };

    let token = reset::generate_reset_token();
    let expiry = reset::reset_token_expiry(chrono::Utc::now());
    User::set_reset_token(&state.db, user.id, &token, expiry).await?;

    let reset_link = format!("{}/reset-password?token={}", state.config.frontend_url, token);

    if let Err(e) = state.mailer.send_password_reset(&user.email, &reset_link).await {
        warn!(user_id = %user.id, "Reset mail dispatch failed, rolling back token");
        User::clear_reset_token(&state.db, user.id).await?;
        return Err(ApiError::from(e));
    }

    Ok(ack())
}

/// Reset a password with a token from a reset link
///
/// The token is consumed atomically: the same statement that matches an
/// unexpired token also writes the new hash and clears the token, so it
/// works at most once.
///
/// # Errors
///
/// - `400 Bad Request`: The token is unknown, already used, or expired
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()
        .map_err(|_| ApiError::BadRequest("Invalid or expired reset token".to_string()))?;

    let new_hash = password::hash_password(&req.new_password)?;

    User::consume_reset_token(&state.db, &req.token, &new_hash)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid or expired reset token".to_string()))?;

    Ok(Json(MessageResponse {
        message: "Password has been reset".to_string(),
    }))
}

/// Change the authenticated user's password
///
/// Existing refresh tokens stay valid; only the credential changes.
///
/// # Errors
///
/// - `400 Bad Request`: The current password does not match
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !password::verify_password(&req.current_password, &user.password_hash)? {
        return Err(ApiError::BadRequest(
            "Current password is incorrect".to_string(),
        ));
    }

    let new_hash = password::hash_password(&req.new_password)?;
    User::set_password(&state.db, user.id, &new_hash).await?;

    Ok(Json(MessageResponse {
        message: "Password changed".to_string(),
    }))
}

/// Update the authenticated user's profile
///
/// Partial update: omitted fields keep their current value.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let user = User::update_profile(&state.db, auth.user_id, req.full_name, req.profile_picture)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}
