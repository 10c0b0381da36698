//! Feedback collection operations

use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use crate::docstore::models::Feedback;
use crate::{Error, Result};

fn feedback_from_row(row: &SqliteRow) -> Result<Feedback> {
    let id: String = row.get("id");
    let user_id: Option<String> = row.get("user_id");
    Ok(Feedback {
        id: Uuid::parse_str(&id).map_err(|e| Error::Internal(e.to_string()))?,
        user_id: user_id
            .map(|s| Uuid::parse_str(&s).map_err(|e| Error::Internal(e.to_string())))
            .transpose()?,
        text: row.get("text"),
        rating: row.get("rating"),
        checked: row.get::<i64, _>("checked") != 0,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Insert a new feedback document
pub async fn insert_feedback(pool: &SqlitePool, feedback: &Feedback) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO feedback (id, user_id, text, rating, checked, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(feedback.id.to_string())
    .bind(feedback.user_id.map(|id| id.to_string()))
    .bind(&feedback.text)
    .bind(feedback.rating)
    .bind(feedback.checked as i64)
    .bind(feedback.created_at)
    .bind(feedback.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// List feedback, optionally filtered by checked state, newest first
pub async fn list_feedback(pool: &SqlitePool, checked: Option<bool>) -> Result<Vec<Feedback>> {
    let rows = match checked {
        Some(checked) => {
            sqlx::query(
                "SELECT id, user_id, text, rating, checked, created_at, updated_at
                 FROM feedback WHERE checked = ? ORDER BY created_at DESC",
            )
            .bind(checked as i64)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                "SELECT id, user_id, text, rating, checked, created_at, updated_at
                 FROM feedback ORDER BY created_at DESC",
            )
            .fetch_all(pool)
            .await?
        }
    };

    rows.iter().map(feedback_from_row).collect()
}

/// Mark a feedback document as reviewed by an admin
pub async fn mark_checked(pool: &SqlitePool, feedback_id: Uuid) -> Result<u64> {
    let result = sqlx::query("UPDATE feedback SET checked = 1, updated_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(feedback_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docstore::init::init_document_schema;

    #[tokio::test]
    async fn test_feedback_checked_filter() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        init_document_schema(&pool).await.unwrap();

        let anonymous = Feedback::new(None, "love it".to_string(), 9);
        let signed = Feedback::new(Some(Uuid::new_v4()), "search is slow".to_string(), 5);
        insert_feedback(&pool, &anonymous).await.unwrap();
        insert_feedback(&pool, &signed).await.unwrap();

        mark_checked(&pool, signed.id).await.unwrap();

        let unchecked = list_feedback(&pool, Some(false)).await.unwrap();
        assert_eq!(unchecked.len(), 1);
        assert_eq!(unchecked[0].id, anonymous.id);
        assert!(unchecked[0].user_id.is_none());

        let all = list_feedback(&pool, None).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
