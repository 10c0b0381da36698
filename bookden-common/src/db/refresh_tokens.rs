//! Refresh token queries
//!
//! Rows are single-use: consumed tokens and expired tokens are deleted, never
//! updated in place.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::RefreshToken;
use crate::{Error, Result};

/// Persist a freshly issued refresh token
pub async fn insert_token(pool: &SqlitePool, token: &RefreshToken) -> Result<()> {
    sqlx::query("INSERT INTO refresh_tokens (id, user_id, token, expires_at) VALUES (?, ?, ?, ?)")
        .bind(token.id.to_string())
        .bind(token.user_id.to_string())
        .bind(&token.token)
        .bind(token.expires_at)
        .execute(pool)
        .await?;

    Ok(())
}

/// Look up a stored token by its opaque value
pub async fn get_by_token(pool: &SqlitePool, token: &str) -> Result<Option<RefreshToken>> {
    let row: Option<(String, String, String, DateTime<Utc>)> = sqlx::query_as(
        "SELECT id, user_id, token, expires_at FROM refresh_tokens WHERE token = ?",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    match row {
        Some((id, user_id, token, expires_at)) => Ok(Some(RefreshToken {
            id: Uuid::parse_str(&id).map_err(|e| Error::Internal(e.to_string()))?,
            user_id: Uuid::parse_str(&user_id).map_err(|e| Error::Internal(e.to_string()))?,
            token,
            expires_at,
        })),
        None => Ok(None),
    }
}

/// Delete a stored token by value; returns the number of rows removed
pub async fn delete_by_token(pool: &SqlitePool, token: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM refresh_tokens WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Delete every token whose expiry is strictly before `now`
pub async fn delete_expired(pool: &SqlitePool, now: DateTime<Utc>) -> Result<u64> {
    let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < ?")
        .bind(now)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
