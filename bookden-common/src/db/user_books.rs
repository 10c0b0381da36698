//! Reading progress queries

use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use crate::db::models::{ReadingStatus, UserBook};
use crate::{Error, Result};

fn user_book_from_row(row: &SqliteRow) -> Result<UserBook> {
    let user_id: String = row.get("user_id");
    let book_id: String = row.get("book_id");
    let status: String = row.get("status");
    Ok(UserBook {
        user_id: Uuid::parse_str(&user_id).map_err(|e| Error::Internal(e.to_string()))?,
        book_id: Uuid::parse_str(&book_id).map_err(|e| Error::Internal(e.to_string()))?,
        status: ReadingStatus::parse(&status)
            .ok_or_else(|| Error::Internal(format!("unknown reading status: {}", status)))?,
        pages_read: row.get("pages_read"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Insert or update the (user, book) progress row
pub async fn upsert_progress(
    pool: &SqlitePool,
    user_id: Uuid,
    book_id: Uuid,
    status: ReadingStatus,
    pages_read: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO user_books (user_id, book_id, status, pages_read, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id, book_id) DO UPDATE SET
            status = excluded.status,
            pages_read = excluded.pages_read,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(user_id.to_string())
    .bind(book_id.to_string())
    .bind(status.as_str())
    .bind(pages_read)
    .bind(Utc::now())
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

/// List a user's shelf ordered by last update
pub async fn list_progress_for_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<UserBook>> {
    let rows = sqlx::query(
        "SELECT user_id, book_id, status, pages_read, created_at, updated_at
         FROM user_books WHERE user_id = ? ORDER BY updated_at DESC",
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(user_book_from_row).collect()
}

/// Remove a book from a user's shelf
pub async fn delete_progress(pool: &SqlitePool, user_id: Uuid, book_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM user_books WHERE user_id = ? AND book_id = ?")
        .bind(user_id.to_string())
        .bind(book_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
