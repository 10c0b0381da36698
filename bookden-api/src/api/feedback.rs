//! Feedback handlers
//!
//! Feedback documents are independent of books and reviews. Anyone logged in
//! may submit; only admins list and mark entries as checked.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use bookden_common::docstore::feedback;
use bookden_common::docstore::models::Feedback;
use bookden_common::Error;

use crate::api::auth::{require_admin, AuthUser};
use crate::api::error::ApiError;
use crate::api::types::{FeedbackRequest, FeedbackResponse, ListFeedbackQuery};
use crate::AppState;

/// POST /feedback
pub async fn create_feedback(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackResponse>), ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text must not be empty".to_string()));
    }
    if !(1..=10).contains(&req.rating) {
        return Err(ApiError::BadRequest(
            "rating must be between 1 and 10".to_string(),
        ));
    }

    let user_id = if req.anonymous { None } else { Some(auth.id) };
    let entry = Feedback::new(user_id, req.text, req.rating);
    feedback::insert_feedback(&state.docs, &entry).await?;

    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// GET /feedback
pub async fn list_feedback(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ListFeedbackQuery>,
) -> Result<Json<Vec<FeedbackResponse>>, ApiError> {
    require_admin(&auth)?;

    let entries = feedback::list_feedback(&state.docs, query.checked).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// POST /feedback/:id/check
pub async fn check_feedback(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(feedback_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_admin(&auth)?;

    let rows = feedback::mark_checked(&state.docs, feedback_id).await?;
    if rows == 0 {
        return Err(Error::NotFound(format!("feedback {}", feedback_id)).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
