//! Reading progress handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use bookden_common::db::user_books;
use bookden_common::Error;

use crate::api::auth::AuthUser;
use crate::api::error::ApiError;
use crate::api::types::{ProgressRequest, ProgressResponse};
use crate::AppState;

/// PUT /users/me/books
///
/// Upserts the caller's shelf entry for a book.
pub async fn upsert_progress(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<ProgressRequest>,
) -> Result<StatusCode, ApiError> {
    if req.pages_read < 0 {
        return Err(ApiError::BadRequest("pages_read must not be negative".to_string()));
    }

    // The book must exist on the shelf's other end
    state.books.get(req.book_id, false).await?;

    user_books::upsert_progress(
        &state.catalog,
        auth.id,
        req.book_id,
        req.status,
        req.pages_read,
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/me/books
pub async fn list_progress(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<ProgressResponse>>, ApiError> {
    let entries = user_books::list_progress_for_user(&state.catalog, auth.id).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// DELETE /users/me/books/:book_id
pub async fn delete_progress(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(book_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let rows = user_books::delete_progress(&state.catalog, auth.id, book_id).await?;
    if rows == 0 {
        return Err(Error::NotFound(format!("shelf entry for book {}", book_id)).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
