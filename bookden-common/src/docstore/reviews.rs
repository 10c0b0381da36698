//! Review collection operations

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use crate::docstore::models::{Review, ReviewVersion};
use crate::{Error, Result};

fn review_from_row(row: &SqliteRow) -> Result<Review> {
    let id: String = row.get("id");
    let book_id: String = row.get("book_id");
    let user_id: String = row.get("user_id");
    let versions_json: String = row.get("versions");

    let versions: Vec<ReviewVersion> = serde_json::from_str(&versions_json)
        .map_err(|e| Error::Internal(format!("malformed version history: {}", e)))?;

    Ok(Review {
        id: Uuid::parse_str(&id).map_err(|e| Error::Internal(e.to_string()))?,
        book_id: Uuid::parse_str(&book_id).map_err(|e| Error::Internal(e.to_string()))?,
        user_id: Uuid::parse_str(&user_id).map_err(|e| Error::Internal(e.to_string()))?,
        text: row.get("text"),
        rating: row.get("rating"),
        likes: row.get("likes"),
        dislikes: row.get("dislikes"),
        versions,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const REVIEW_COLUMNS: &str =
    "id, book_id, user_id, text, rating, likes, dislikes, versions, created_at, updated_at";

/// Insert a new review document
pub async fn insert_review(pool: &SqlitePool, review: &Review) -> Result<()> {
    let versions_json = serde_json::to_string(&review.versions)
        .map_err(|e| Error::Internal(e.to_string()))?;

    sqlx::query(
        r#"
        INSERT INTO reviews (id, book_id, user_id, text, rating, likes, dislikes,
                             versions, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(review.id.to_string())
    .bind(review.book_id.to_string())
    .bind(review.user_id.to_string())
    .bind(&review.text)
    .bind(review.rating)
    .bind(review.likes)
    .bind(review.dislikes)
    .bind(versions_json)
    .bind(review.created_at)
    .bind(review.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a review document by id
pub async fn get_review(pool: &SqlitePool, review_id: Uuid) -> Result<Option<Review>> {
    let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?");
    let row = sqlx::query(&sql)
        .bind(review_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(review_from_row).transpose()
}

/// All reviews referencing one book, oldest first
pub async fn list_reviews_for_book(pool: &SqlitePool, book_id: Uuid) -> Result<Vec<Review>> {
    let sql = format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews WHERE book_id = ? ORDER BY created_at, id"
    );
    let rows = sqlx::query(&sql)
        .bind(book_id.to_string())
        .fetch_all(pool)
        .await?;

    rows.iter().map(review_from_row).collect()
}

/// Write an edited review back: new text/rating, bumped `updated_at`, and
/// the full (already appended-to) version history
pub async fn apply_edit(
    pool: &SqlitePool,
    review_id: Uuid,
    text: &str,
    rating: i64,
    versions: &[ReviewVersion],
    updated_at: DateTime<Utc>,
) -> Result<u64> {
    let versions_json =
        serde_json::to_string(versions).map_err(|e| Error::Internal(e.to_string()))?;

    let result = sqlx::query(
        "UPDATE reviews SET text = ?, rating = ?, versions = ?, updated_at = ? WHERE id = ?",
    )
    .bind(text)
    .bind(rating)
    .bind(versions_json)
    .bind(updated_at)
    .bind(review_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Delete a review document; returns the number of rows removed
pub async fn delete_review(pool: &SqlitePool, review_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM reviews WHERE id = ?")
        .bind(review_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Remove every review referencing a book (book deletion cleanup)
pub async fn delete_reviews_for_book(pool: &SqlitePool, book_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM reviews WHERE book_id = ?")
        .bind(book_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Grouped aggregation: arithmetic mean of `rating` over a book's reviews
///
/// No matching reviews yields 0.0, not an error.
pub async fn average_rating_for_book(pool: &SqlitePool, book_id: Uuid) -> Result<f64> {
    let average: Option<f64> =
        sqlx::query_scalar("SELECT AVG(rating) FROM reviews WHERE book_id = ?")
            .bind(book_id.to_string())
            .fetch_one(pool)
            .await?;

    Ok(average.unwrap_or(0.0))
}

/// Write the derived like/dislike counters onto a review in one update
pub async fn set_vote_counters(
    pool: &SqlitePool,
    review_id: Uuid,
    likes: i64,
    dislikes: i64,
) -> Result<u64> {
    let result = sqlx::query("UPDATE reviews SET likes = ?, dislikes = ? WHERE id = ?")
        .bind(likes)
        .bind(dislikes)
        .bind(review_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
