//! Book handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::DateTime;
use uuid::Uuid;

use crate::api::auth::{require_moderator, AuthUser};
use crate::api::error::ApiError;
use crate::api::types::{
    BookResponse, CreateBookRequest, ListBooksQuery, PaginatedBooksResponse,
    RecalculateResponse, UpdateBookRequest,
};
use crate::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// Encode a listing cursor as "<rfc3339>|<uuid>"
fn encode_cursor(created_at: chrono::DateTime<chrono::Utc>, id: Uuid) -> String {
    format!("{}|{}", created_at.to_rfc3339(), id)
}

fn decode_cursor(cursor: &str) -> Result<(chrono::DateTime<chrono::Utc>, Uuid), ApiError> {
    let (ts, id) = cursor
        .split_once('|')
        .ok_or_else(|| ApiError::BadRequest("malformed cursor".to_string()))?;
    let created_at = DateTime::parse_from_rfc3339(ts)
        .map_err(|_| ApiError::BadRequest("malformed cursor".to_string()))?
        .with_timezone(&chrono::Utc);
    let id = Uuid::parse_str(id).map_err(|_| ApiError::BadRequest("malformed cursor".to_string()))?;
    Ok((created_at, id))
}

/// POST /books
pub async fn create_book(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let book = state
        .books
        .create(
            req.title,
            req.description,
            req.cover_image,
            req.author_ids,
            auth.role,
        )
        .await?;

    let authors = state.books.authors_of(book.id).await?;
    Ok((StatusCode::CREATED, Json(BookResponse::from_book(book, authors))))
}

/// GET /books/:id
pub async fn get_book(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = state.books.get(book_id, false).await?;
    let authors = state.books.authors_of(book.id).await?;
    Ok(Json(BookResponse::from_book(book, authors)))
}

/// PUT /books/:id
pub async fn update_book(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(book_id): Path<Uuid>,
    Json(req): Json<UpdateBookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    require_moderator(&auth)?;

    let book = state
        .books
        .update(book_id, req.title, req.description, req.cover_image, req.author_ids)
        .await?;

    let authors = state.books.authors_of(book.id).await?;
    Ok(Json(BookResponse::from_book(book, authors)))
}

/// POST /books/:id/confirm
pub async fn confirm_book(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(book_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_moderator(&auth)?;
    state.books.confirm(book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /books/:id
pub async fn delete_book(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(book_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_moderator(&auth)?;
    state.books.delete(book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /books
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<ListBooksQuery>,
) -> Result<Json<PaginatedBooksResponse>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let after = query.after.as_deref().map(decode_cursor).transpose()?;
    let only_confirmed = !query.include_unconfirmed;

    let books = state.books.list(limit, after, only_confirmed).await?;

    let next_cursor = if books.len() as i64 == limit {
        books.last().map(|b| encode_cursor(b.created_at, b.id))
    } else {
        None
    };

    let mut responses = Vec::with_capacity(books.len());
    for book in books {
        let authors = state.books.authors_of(book.id).await?;
        responses.push(BookResponse::from_book(book, authors));
    }

    Ok(Json(PaginatedBooksResponse {
        books: responses,
        next_cursor,
    }))
}

/// POST /maintenance/recalculate-ratings
///
/// Explicit repair pass over every book's aggregate rating.
pub async fn recalculate_ratings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<RecalculateResponse>, ApiError> {
    require_moderator(&auth)?;

    let books_recalculated = state.ratings.recalculate_all().await?;
    Ok(Json(RecalculateResponse { books_recalculated }))
}
