//! Bearer-token authentication middleware
//!
//! Validates the access token on protected routes and attaches the caller's
//! identity and role to the request. Role checks happen in the handlers via
//! the capability methods on `Role`.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use bookden_common::auth::jwt;
use bookden_common::roles::Role;
use bookden_common::Error;

use crate::api::error::ApiError;
use crate::AppState;

/// Authenticated caller, attached as a request extension
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

/// Authentication middleware for protected routes
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing authorization header".to_string()))?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("expected bearer token".to_string()))?;

    let claims = jwt::validate_token(token, &state.jwt_secret).map_err(|err| match err {
        Error::InvalidState(_) => ApiError::Unauthorized("access token expired".to_string()),
        _ => ApiError::Unauthorized("invalid access token".to_string()),
    })?;

    request.extensions_mut().insert(AuthUser {
        id: claims.sub,
        role: claims.role,
    });

    Ok(next.run(request).await)
}

/// Reject callers without moderation capability
pub fn require_moderator(user: &AuthUser) -> Result<(), ApiError> {
    if !user.role.can_moderate() {
        return Err(ApiError::Forbidden(
            "moderator or admin role required".to_string(),
        ));
    }
    Ok(())
}

/// Reject callers without the admin role
pub fn require_admin(user: &AuthUser) -> Result<(), ApiError> {
    if !user.role.is_admin() {
        return Err(ApiError::Forbidden("admin role required".to_string()));
    }
    Ok(())
}
