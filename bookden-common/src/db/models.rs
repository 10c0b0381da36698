//! Catalog store record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::Role;

/// Book record
///
/// `average_rating` is derived from the book's review documents and is only
/// written by the rating aggregator.
#[derive(Debug, Clone, Serialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Reference to a stored cover image (plain string, may be empty)
    pub cover_image: String,
    /// Set at creation when the creator can moderate, otherwise by a
    /// moderator later
    pub confirmed: bool,
    pub average_rating: f64,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Create a new unconfirmed book with a fresh identity
    pub fn new(title: String, description: String, cover_image: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            cover_image,
            confirmed: false,
            average_rating: 0.0,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Author record
#[derive(Debug, Clone, Serialize)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
    pub bio: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Author {
    pub fn new(name: String, bio: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            bio,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// User account record
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub password_salt: String,
    pub role: Role,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reading status of a book on a user's shelf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    Reading,
    Completed,
    Dropped,
}

impl ReadingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::Reading => "reading",
            ReadingStatus::Completed => "completed",
            ReadingStatus::Dropped => "dropped",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "reading" => Some(ReadingStatus::Reading),
            "completed" => Some(ReadingStatus::Completed),
            "dropped" => Some(ReadingStatus::Dropped),
            _ => None,
        }
    }
}

/// Per-user reading progress row
#[derive(Debug, Clone, Serialize)]
pub struct UserBook {
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub status: ReadingStatus,
    pub pages_read: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored refresh token row
///
/// Valid only while present and unexpired; deleted when consumed by a
/// successful refresh.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}
