//! Document types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Review document
///
/// `book_id` and `user_id` are soft references into the catalog store.
/// `likes`/`dislikes` are derived from vote documents, not authoritative.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    /// 1-10 inclusive
    pub rating: i64,
    pub likes: i64,
    pub dislikes: i64,
    /// Append-only prior-version snapshots, ordered by edit time
    pub versions: Vec<ReviewVersion>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Create a new review document with empty version history
    pub fn new(book_id: Uuid, user_id: Uuid, text: String, rating: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            book_id,
            user_id,
            text,
            rating,
            likes: 0,
            dislikes: 0,
            versions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Immutable snapshot of a review's prior text, kept on edit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewVersion {
    pub text: String,
    pub edited_at: DateTime<Utc>,
    pub edited_by: Uuid,
}

/// A single user's vote on a review: 1 like, -1 dislike
#[derive(Debug, Clone, Serialize)]
pub struct ReviewVote {
    pub id: Uuid,
    pub review_id: Uuid,
    pub user_id: Uuid,
    pub vote: i64,
}

/// Free-standing application feedback, independent of books and reviews
#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub id: Uuid,
    /// Optional author reference; anonymous feedback carries none
    pub user_id: Option<Uuid>,
    pub text: String,
    pub rating: i64,
    pub checked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Feedback {
    pub fn new(user_id: Option<Uuid>, text: String, rating: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            text,
            rating,
            checked: false,
            created_at: now,
            updated_at: now,
        }
    }
}
