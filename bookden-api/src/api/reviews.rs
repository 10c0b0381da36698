//! Review and vote handlers
//!
//! Edit/delete authorization happens here: the review's author, a moderator,
//! or an admin. The lifecycle service itself does not re-check.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::api::auth::AuthUser;
use crate::api::error::ApiError;
use crate::api::types::{
    CreateReviewRequest, EditReviewRequest, ReviewResponse, VoteRequest, VoteResponse,
};
use crate::AppState;

/// POST /books/:id/reviews
pub async fn create_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(book_id): Path<Uuid>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    // The book must exist and be visible before a review can reference it
    state.books.get(book_id, false).await?;

    let review = state
        .reviews
        .create(book_id, req.text, req.rating, auth.id)
        .await?;

    Ok((StatusCode::CREATED, Json(review.into())))
}

/// GET /books/:id/reviews
pub async fn list_for_book(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<Vec<ReviewResponse>>, ApiError> {
    let reviews = state.reviews.list_for_book(book_id).await?;
    Ok(Json(reviews.into_iter().map(Into::into).collect()))
}

/// PUT /reviews/:id
pub async fn edit_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(review_id): Path<Uuid>,
    Json(req): Json<EditReviewRequest>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let existing = state.reviews.get(review_id).await?;
    if existing.user_id != auth.id && !auth.role.can_moderate() {
        return Err(ApiError::Forbidden(
            "only the author or a moderator may edit a review".to_string(),
        ));
    }

    let review = state
        .reviews
        .edit(review_id, req.text, req.rating, auth.id)
        .await?;

    Ok(Json(review.into()))
}

/// DELETE /reviews/:id
pub async fn delete_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(review_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let existing = state.reviews.get(review_id).await?;
    if existing.user_id != auth.id && !auth.role.can_moderate() {
        return Err(ApiError::Forbidden(
            "only the author or a moderator may delete a review".to_string(),
        ));
    }

    state.reviews.delete(review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /reviews/:id/vote
pub async fn vote_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(review_id): Path<Uuid>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, ApiError> {
    let (likes, dislikes) = state.votes.vote(review_id, auth.id, req.vote).await?;
    Ok(Json(VoteResponse { likes, dislikes }))
}
