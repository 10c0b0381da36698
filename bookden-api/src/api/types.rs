//! Request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bookden_common::db::models::{Author, Book, ReadingStatus, User, UserBook};
use bookden_common::docstore::models::{Feedback, Review, ReviewVersion};
use bookden_common::roles::Role;

// ---- auth ----

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        }
    }
}

// ---- books ----

#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub author_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_image: String,
    /// When present, replaces the author links
    pub author_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Serialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub cover_image: String,
    pub confirmed: bool,
    pub average_rating: f64,
    pub authors: Vec<AuthorSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookResponse {
    pub fn from_book(book: Book, authors: Vec<Author>) -> Self {
        Self {
            id: book.id,
            title: book.title,
            description: book.description,
            cover_image: book.cover_image,
            confirmed: book.confirmed,
            average_rating: book.average_rating,
            authors: authors
                .into_iter()
                .map(|a| AuthorSummary { id: a.id, name: a.name })
                .collect(),
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListBooksQuery {
    pub limit: Option<i64>,
    /// Opaque cursor from a previous page
    pub after: Option<String>,
    #[serde(default)]
    pub include_unconfirmed: bool,
}

#[derive(Debug, Serialize)]
pub struct PaginatedBooksResponse {
    pub books: Vec<BookResponse>,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecalculateResponse {
    pub books_recalculated: usize,
}

// ---- authors ----

#[derive(Debug, Deserialize)]
pub struct AuthorRequest {
    pub name: String,
    #[serde(default)]
    pub bio: String,
}

#[derive(Debug, Serialize)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub name: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Author> for AuthorResponse {
    fn from(author: Author) -> Self {
        Self {
            id: author.id,
            name: author.name,
            bio: author.bio,
            created_at: author.created_at,
            updated_at: author.updated_at,
        }
    }
}

// ---- reviews ----

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub text: String,
    pub rating: i64,
}

#[derive(Debug, Deserialize)]
pub struct EditReviewRequest {
    pub text: String,
    pub rating: i64,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub vote: i64,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub likes: i64,
    pub dislikes: i64,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub rating: i64,
    pub likes: i64,
    pub dislikes: i64,
    pub versions: Vec<ReviewVersion>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            book_id: review.book_id,
            user_id: review.user_id,
            text: review.text,
            rating: review.rating,
            likes: review.likes,
            dislikes: review.dislikes,
            versions: review.versions,
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}

// ---- feedback ----

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub text: String,
    pub rating: i64,
    /// Anonymous feedback omits the author reference even when logged in
    #[serde(default)]
    pub anonymous: bool,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub text: String,
    pub rating: i64,
    pub checked: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Feedback> for FeedbackResponse {
    fn from(feedback: Feedback) -> Self {
        Self {
            id: feedback.id,
            user_id: feedback.user_id,
            text: feedback.text,
            rating: feedback.rating,
            checked: feedback.checked,
            created_at: feedback.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListFeedbackQuery {
    pub checked: Option<bool>,
}

// ---- reading progress ----

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub book_id: Uuid,
    pub status: ReadingStatus,
    #[serde(default)]
    pub pages_read: i64,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub book_id: Uuid,
    pub status: ReadingStatus,
    pub pages_read: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<UserBook> for ProgressResponse {
    fn from(entry: UserBook) -> Self {
        Self {
            book_id: entry.book_id,
            status: entry.status,
            pages_read: entry.pages_read,
            updated_at: entry.updated_at,
        }
    }
}
