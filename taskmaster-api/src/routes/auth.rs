/// Token refresh endpoint
///
/// # Endpoints
///
/// - `POST /auth/refresh-token` - Exchange a refresh token for a new
///   access token
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use taskmaster_shared::auth::jwt;

/// Refresh request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (15 min)
    pub access_token: String,
}

/// Exchanges a refresh token for a new access token
///
/// The refresh token is validated for signature and strict expiry, then
/// checked against the revocation list; a token revoked by logout is
/// rejected even though its signature still verifies.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid, expired, or revoked refresh token
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())?;

    if state.revocation.is_revoked(claims.jti).await? {
        return Err(ApiError::Unauthorized("Token has been revoked".to_string()));
    }

    let access_claims = jwt::Claims::new(claims.sub, jwt::TokenType::Access);
    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}
