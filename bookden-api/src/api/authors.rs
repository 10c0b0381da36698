//! Author handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

use bookden_common::db::authors;
use bookden_common::db::models::Author;
use bookden_common::Error;

use crate::api::auth::{require_moderator, AuthUser};
use crate::api::error::ApiError;
use crate::api::types::{AuthorRequest, AuthorResponse};
use crate::AppState;

/// POST /authors
pub async fn create_author(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<AuthorRequest>,
) -> Result<(StatusCode, Json<AuthorResponse>), ApiError> {
    require_moderator(&auth)?;

    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".to_string()));
    }

    let author = Author::new(req.name, req.bio);
    authors::create_author(&state.catalog, &author).await?;
    Ok((StatusCode::CREATED, Json(author.into())))
}

/// GET /authors/:id
pub async fn get_author(
    State(state): State<AppState>,
    Path(author_id): Path<Uuid>,
) -> Result<Json<AuthorResponse>, ApiError> {
    let author = authors::get_author(&state.catalog, author_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("author {}", author_id)))?;
    Ok(Json(author.into()))
}

/// GET /authors
pub async fn list_authors(
    State(state): State<AppState>,
) -> Result<Json<Vec<AuthorResponse>>, ApiError> {
    let all = authors::list_authors(&state.catalog).await?;
    Ok(Json(all.into_iter().map(Into::into).collect()))
}

/// PUT /authors/:id
pub async fn update_author(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(author_id): Path<Uuid>,
    Json(req): Json<AuthorRequest>,
) -> Result<Json<AuthorResponse>, ApiError> {
    require_moderator(&auth)?;

    let mut author = authors::get_author(&state.catalog, author_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("author {}", author_id)))?;

    author.name = req.name;
    author.bio = req.bio;
    author.updated_at = Utc::now();
    authors::update_author(&state.catalog, &author).await?;

    Ok(Json(author.into()))
}

/// DELETE /authors/:id
pub async fn delete_author(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(author_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_moderator(&auth)?;
    authors::soft_delete_author(&state.catalog, author_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
