//! Author queries

use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use crate::db::models::Author;
use crate::{Error, Result};

fn author_from_row(row: &SqliteRow) -> Result<Author> {
    let id: String = row.get("id");
    Ok(Author {
        id: Uuid::parse_str(&id).map_err(|e| Error::Internal(e.to_string()))?,
        name: row.get("name"),
        bio: row.get("bio"),
        deleted_at: row.get("deleted_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Insert a new author
pub async fn create_author(pool: &SqlitePool, author: &Author) -> Result<()> {
    sqlx::query(
        "INSERT INTO authors (id, name, bio, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(author.id.to_string())
    .bind(&author.name)
    .bind(&author.bio)
    .bind(author.created_at)
    .bind(author.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load an author by id, skipping soft-deleted rows
pub async fn get_author(pool: &SqlitePool, author_id: Uuid) -> Result<Option<Author>> {
    let row = sqlx::query(
        "SELECT id, name, bio, deleted_at, created_at, updated_at
         FROM authors WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(author_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(author_from_row).transpose()
}

/// Load several authors by id (soft-deleted rows skipped)
pub async fn get_authors_by_ids(pool: &SqlitePool, author_ids: &[Uuid]) -> Result<Vec<Author>> {
    let mut authors = Vec::with_capacity(author_ids.len());
    for author_id in author_ids {
        if let Some(author) = get_author(pool, *author_id).await? {
            authors.push(author);
        }
    }
    Ok(authors)
}

/// Update an author's name and bio
pub async fn update_author(pool: &SqlitePool, author: &Author) -> Result<()> {
    let result = sqlx::query(
        "UPDATE authors SET name = ?, bio = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(&author.name)
    .bind(&author.bio)
    .bind(Utc::now())
    .bind(author.id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("author {}", author.id)));
    }
    Ok(())
}

/// Soft-delete an author and remove their book links
pub async fn soft_delete_author(pool: &SqlitePool, author_id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "UPDATE authors SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(Utc::now())
    .bind(Utc::now())
    .bind(author_id.to_string())
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("author {}", author_id)));
    }

    sqlx::query("DELETE FROM book_authors WHERE author_id = ?")
        .bind(author_id.to_string())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// List all live authors ordered by name
pub async fn list_authors(pool: &SqlitePool) -> Result<Vec<Author>> {
    let rows = sqlx::query(
        "SELECT id, name, bio, deleted_at, created_at, updated_at
         FROM authors WHERE deleted_at IS NULL ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(author_from_row).collect()
}
