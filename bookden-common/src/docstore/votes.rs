//! Review vote collection operations

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::Result;

/// Upsert the vote document for (review, voter)
///
/// The unique key on (review_id, user_id) makes this the serialization point
/// for concurrent votes; a prior opposite vote is overwritten in place.
pub async fn upsert_vote(
    pool: &SqlitePool,
    review_id: Uuid,
    user_id: Uuid,
    vote: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO review_votes (id, review_id, user_id, vote)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(review_id, user_id) DO UPDATE SET vote = excluded.vote
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(review_id.to_string())
    .bind(user_id.to_string())
    .bind(vote)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete the vote document for (review, voter); absence is not an error
pub async fn delete_vote(pool: &SqlitePool, review_id: Uuid, user_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM review_votes WHERE review_id = ? AND user_id = ?")
        .bind(review_id.to_string())
        .bind(user_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Remove every vote referencing a review (review deletion cleanup)
pub async fn delete_votes_for_review(pool: &SqlitePool, review_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM review_votes WHERE review_id = ?")
        .bind(review_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Grouped aggregation over a review's votes: (likes, dislikes)
///
/// Full recount every time, not an incremental counter; concurrent voters
/// converge because the last recount to commit reflects the true state.
pub async fn tally_votes(pool: &SqlitePool, review_id: Uuid) -> Result<(i64, i64)> {
    let (likes, dislikes): (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN vote = 1 THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN vote = -1 THEN 1 ELSE 0 END), 0)
        FROM review_votes
        WHERE review_id = ?
        "#,
    )
    .bind(review_id.to_string())
    .fetch_one(pool)
    .await?;

    Ok((likes, dislikes))
}

/// Number of vote documents for (review, voter); 0 or 1 by the unique key
pub async fn count_votes_for_pair(
    pool: &SqlitePool,
    review_id: Uuid,
    user_id: Uuid,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM review_votes WHERE review_id = ? AND user_id = ?",
    )
    .bind(review_id.to_string())
    .bind(user_id.to_string())
    .fetch_one(pool)
    .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docstore::init::init_document_schema;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        init_document_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_upsert_overwrites_prior_vote() {
        let pool = test_pool().await;
        let review_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        upsert_vote(&pool, review_id, user_id, 1).await.unwrap();
        upsert_vote(&pool, review_id, user_id, -1).await.unwrap();

        // Still exactly one document for the pair
        assert_eq!(count_votes_for_pair(&pool, review_id, user_id).await.unwrap(), 1);

        let (likes, dislikes) = tally_votes(&pool, review_id).await.unwrap();
        assert_eq!((likes, dislikes), (0, 1));
    }

    #[tokio::test]
    async fn test_delete_vote_absent_is_ok() {
        let pool = test_pool().await;

        let removed = delete_vote(&pool, Uuid::new_v4(), Uuid::new_v4()).await.unwrap();
        assert_eq!(removed, 0);
    }

    #[tokio::test]
    async fn test_tally_counts_by_value() {
        let pool = test_pool().await;
        let review_id = Uuid::new_v4();

        upsert_vote(&pool, review_id, Uuid::new_v4(), 1).await.unwrap();
        upsert_vote(&pool, review_id, Uuid::new_v4(), 1).await.unwrap();
        upsert_vote(&pool, review_id, Uuid::new_v4(), -1).await.unwrap();

        let (likes, dislikes) = tally_votes(&pool, review_id).await.unwrap();
        assert_eq!((likes, dislikes), (2, 1));
    }
}
