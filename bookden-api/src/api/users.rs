//! Account and session handlers

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};

use bookden_common::Error;

use crate::api::auth::AuthUser;
use crate::api::error::ApiError;
use crate::api::types::{
    LoginRequest, RefreshRequest, RegisterRequest, TokenResponse, UserResponse,
};
use crate::AppState;

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state
        .users
        .register(req.username, req.email, req.password)
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let pair = state
        .users
        .login(&req.email, &req.password)
        .await
        .map_err(|err| match err {
            // Credential failures come back as 401, not 400
            Error::InvalidInput(msg) => ApiError::Unauthorized(msg),
            other => ApiError::Service(other),
        })?;

    Ok(Json(TokenResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

/// POST /auth/refresh
///
/// Consumes the presented refresh token and returns a fresh pair. A token
/// that was already consumed fails exactly like one that never existed.
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let pair = state
        .sessions
        .refresh(&req.refresh_token)
        .await
        .map_err(|err| match err {
            Error::NotFound(_) => ApiError::Unauthorized("invalid refresh token".to_string()),
            Error::InvalidState(_) => {
                ApiError::Unauthorized("refresh token expired".to_string())
            }
            Error::Token(_) => ApiError::Unauthorized("invalid refresh token".to_string()),
            other => ApiError::Service(other),
        })?;

    Ok(Json(TokenResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

/// POST /auth/logout
///
/// Revokes the presented refresh token. Idempotent; the access token simply
/// ages out.
pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<StatusCode, ApiError> {
    state.sessions.revoke(&req.refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/me
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.get_user(auth.id).await?;
    Ok(Json(user.into()))
}
