//! Book queries
//!
//! Joined writes (book row + author links) run inside one transaction and
//! roll back together on any step failure.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use crate::db::models::Book;
use crate::{Error, Result};

fn book_from_row(row: &SqliteRow) -> Result<Book> {
    let id: String = row.get("id");
    Ok(Book {
        id: Uuid::parse_str(&id).map_err(|e| Error::Internal(e.to_string()))?,
        title: row.get("title"),
        description: row.get("description"),
        cover_image: row.get("cover_image"),
        confirmed: row.get::<i64, _>("confirmed") != 0,
        average_rating: row.get("average_rating"),
        deleted_at: row.get("deleted_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Insert a book and its author links in one transaction
pub async fn create_book(pool: &SqlitePool, book: &Book, author_ids: &[Uuid]) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO books (id, title, description, cover_image, confirmed,
                           average_rating, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(book.id.to_string())
    .bind(&book.title)
    .bind(&book.description)
    .bind(&book.cover_image)
    .bind(book.confirmed as i64)
    .bind(book.average_rating)
    .bind(book.created_at)
    .bind(book.updated_at)
    .execute(&mut *tx)
    .await?;

    for author_id in author_ids {
        sqlx::query(
            "INSERT INTO book_authors (book_id, author_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(book.id.to_string())
        .bind(author_id.to_string())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Load a book by id, skipping soft-deleted rows
///
/// With `only_confirmed`, unconfirmed books are treated as absent.
pub async fn get_book(
    pool: &SqlitePool,
    book_id: Uuid,
    only_confirmed: bool,
) -> Result<Option<Book>> {
    let mut sql = String::from(
        "SELECT id, title, description, cover_image, confirmed, average_rating,
                deleted_at, created_at, updated_at
         FROM books WHERE id = ? AND deleted_at IS NULL",
    );
    if only_confirmed {
        sql.push_str(" AND confirmed = 1");
    }

    let row = sqlx::query(&sql)
        .bind(book_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(book_from_row).transpose()
}

/// Update a book's fields; when `author_ids` is given, replace the links
pub async fn update_book(
    pool: &SqlitePool,
    book: &Book,
    author_ids: Option<&[Uuid]>,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE books
        SET title = ?, description = ?, cover_image = ?, confirmed = ?, updated_at = ?
        WHERE id = ? AND deleted_at IS NULL
        "#,
    )
    .bind(&book.title)
    .bind(&book.description)
    .bind(&book.cover_image)
    .bind(book.confirmed as i64)
    .bind(Utc::now())
    .bind(book.id.to_string())
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("book {}", book.id)));
    }

    if let Some(author_ids) = author_ids {
        sqlx::query("DELETE FROM book_authors WHERE book_id = ?")
            .bind(book.id.to_string())
            .execute(&mut *tx)
            .await?;

        for author_id in author_ids {
            sqlx::query(
                "INSERT INTO book_authors (book_id, author_id, created_at) VALUES (?, ?, ?)",
            )
            .bind(book.id.to_string())
            .bind(author_id.to_string())
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    Ok(())
}

/// Write the derived mean rating onto the book row
///
/// Single-statement update; the aggregator's only relational write.
pub async fn update_average_rating(
    pool: &SqlitePool,
    book_id: Uuid,
    average_rating: f64,
) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE books SET average_rating = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(average_rating)
    .bind(Utc::now())
    .bind(book_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Soft-delete a book and remove its author links in one transaction
///
/// Review documents live in the other store and are removed separately by
/// the caller.
pub async fn soft_delete_book(pool: &SqlitePool, book_id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "UPDATE books SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(Utc::now())
    .bind(Utc::now())
    .bind(book_id.to_string())
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("book {}", book_id)));
    }

    sqlx::query("DELETE FROM book_authors WHERE book_id = ?")
        .bind(book_id.to_string())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Cursor-paginated listing ordered by (created_at, id)
///
/// `after` is the (created_at, id) pair of the last row from the previous
/// page; `None` starts from the beginning.
pub async fn list_books(
    pool: &SqlitePool,
    limit: i64,
    after: Option<(DateTime<Utc>, Uuid)>,
    only_confirmed: bool,
) -> Result<Vec<Book>> {
    let confirmed_clause = if only_confirmed { " AND confirmed = 1" } else { "" };

    let rows = match after {
        Some((created_at, id)) => {
            let sql = format!(
                "SELECT id, title, description, cover_image, confirmed, average_rating,
                        deleted_at, created_at, updated_at
                 FROM books
                 WHERE deleted_at IS NULL{confirmed_clause}
                   AND (created_at, id) > (?, ?)
                 ORDER BY created_at, id
                 LIMIT ?"
            );
            sqlx::query(&sql)
                .bind(created_at)
                .bind(id.to_string())
                .bind(limit)
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!(
                "SELECT id, title, description, cover_image, confirmed, average_rating,
                        deleted_at, created_at, updated_at
                 FROM books
                 WHERE deleted_at IS NULL{confirmed_clause}
                 ORDER BY created_at, id
                 LIMIT ?"
            );
            sqlx::query(&sql).bind(limit).fetch_all(pool).await?
        }
    };

    rows.iter().map(book_from_row).collect()
}

/// All live book ids (for full aggregate repair)
pub async fn list_book_ids(pool: &SqlitePool) -> Result<Vec<Uuid>> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT id FROM books WHERE deleted_at IS NULL")
            .fetch_all(pool)
            .await?;

    rows.into_iter()
        .map(|(id,)| Uuid::parse_str(&id).map_err(|e| Error::Internal(e.to_string())))
        .collect()
}

/// Author ids linked to one book
pub async fn author_ids_for_book(pool: &SqlitePool, book_id: Uuid) -> Result<Vec<Uuid>> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT author_id FROM book_authors WHERE book_id = ?")
            .bind(book_id.to_string())
            .fetch_all(pool)
            .await?;

    rows.into_iter()
        .map(|(id,)| Uuid::parse_str(&id).map_err(|e| Error::Internal(e.to_string())))
        .collect()
}
