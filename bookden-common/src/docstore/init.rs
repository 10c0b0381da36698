//! Document database initialization

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize the document database connection and create collections if needed
pub async fn init_document_db(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new document database: {}", db_path.display());
    } else {
        info!("Opened existing document database: {}", db_path.display());
    }

    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    init_document_schema(&pool).await?;

    Ok(pool)
}

/// Create all document collections (idempotent - safe to call multiple times)
pub async fn init_document_schema(pool: &SqlitePool) -> Result<()> {
    create_reviews_collection(pool).await?;
    create_review_votes_collection(pool).await?;
    create_feedback_collection(pool).await?;
    Ok(())
}

/// Create the reviews collection
///
/// `versions` holds the append-only edit history as a JSON array; `likes`
/// and `dislikes` are derived counters maintained by the vote tally.
pub async fn create_reviews_collection(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            id TEXT PRIMARY KEY,
            book_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            text TEXT NOT NULL,
            rating INTEGER NOT NULL,
            likes INTEGER NOT NULL DEFAULT 0,
            dislikes INTEGER NOT NULL DEFAULT 0,
            versions TEXT NOT NULL DEFAULT '[]',
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL,
            CHECK (rating >= 1 AND rating <= 10)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviews_book ON reviews(book_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviews_user ON reviews(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the review votes collection
///
/// The unique (review_id, user_id) key serializes concurrent votes: a voter
/// holds at most one vote document per review. "No vote" is the absence of a
/// document, never a stored zero.
pub async fn create_review_votes_collection(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS review_votes (
            id TEXT PRIMARY KEY,
            review_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            vote INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_review_votes_review_user
         ON review_votes(review_id, user_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the feedback collection
pub async fn create_feedback_collection(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS feedback (
            id TEXT PRIMARY KEY,
            user_id TEXT,
            text TEXT NOT NULL,
            rating INTEGER NOT NULL,
            checked INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_feedback_checked ON feedback(checked)")
        .execute(pool)
        .await?;

    Ok(())
}
