//! Vote tally
//!
//! At most one vote document per (review, voter); 0 clears the vote, ±1
//! upserts it. After every change the like/dislike counters are recomputed
//! from scratch with a grouped aggregation and written onto the review in
//! one update, so concurrent voters converge regardless of interleaving.

use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use bookden_common::docstore::{reviews, votes};
use bookden_common::{Error, Result};

#[derive(Clone)]
pub struct VoteService {
    docs: SqlitePool,
}

impl VoteService {
    pub fn new(docs: SqlitePool) -> Self {
        Self { docs }
    }

    /// Record, change, or clear a voter's vote on a review
    ///
    /// Returns the recomputed (likes, dislikes) pair. Values outside
    /// {-1, 0, 1} are rejected before any write.
    pub async fn vote(&self, review_id: Uuid, voter_id: Uuid, value: i64) -> Result<(i64, i64)> {
        if !matches!(value, -1 | 0 | 1) {
            return Err(Error::InvalidState(format!(
                "vote value must be -1, 0 or 1, got {}",
                value
            )));
        }

        // The review must exist; votes do not dangle on purpose
        if reviews::get_review(&self.docs, review_id).await?.is_none() {
            return Err(Error::NotFound(format!("review {}", review_id)));
        }

        if value == 0 {
            // "No vote" is the absence of a document
            votes::delete_vote(&self.docs, review_id, voter_id).await?;
        } else {
            votes::upsert_vote(&self.docs, review_id, voter_id, value).await?;
        }

        let (likes, dislikes) = votes::tally_votes(&self.docs, review_id).await?;

        // Counters are derived, not authoritative: if this write fails the
        // vote document still stands and the next tally repairs the numbers
        if let Err(err) = reviews::set_vote_counters(&self.docs, review_id, likes, dislikes).await
        {
            let condition = Error::PartialConsistency(format!(
                "counter write failed after vote on review {}: {}",
                review_id, err
            ));
            warn!("{}", condition);
        }

        Ok((likes, dislikes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookden_common::docstore::init::init_document_schema;
    use bookden_common::docstore::models::Review;
    use bookden_common::docstore::reviews::{get_review, insert_review};
    use bookden_common::docstore::votes::count_votes_for_pair;

    async fn setup() -> (SqlitePool, VoteService, Review) {
        let docs = SqlitePool::connect("sqlite::memory:").await.unwrap();
        init_document_schema(&docs).await.unwrap();

        let review = Review::new(Uuid::new_v4(), Uuid::new_v4(), "text".to_string(), 7);
        insert_review(&docs, &review).await.unwrap();

        let service = VoteService::new(docs.clone());
        (docs, service, review)
    }

    #[tokio::test]
    async fn test_vote_sequence_one_document_throughout() {
        let (docs, service, review) = setup().await;
        let voter = Uuid::new_v4();

        let (likes, dislikes) = service.vote(review.id, voter, 1).await.unwrap();
        assert_eq!((likes, dislikes), (1, 0));
        assert_eq!(count_votes_for_pair(&docs, review.id, voter).await.unwrap(), 1);

        let (likes, dislikes) = service.vote(review.id, voter, -1).await.unwrap();
        assert_eq!((likes, dislikes), (0, 1));
        assert_eq!(count_votes_for_pair(&docs, review.id, voter).await.unwrap(), 1);

        let (likes, dislikes) = service.vote(review.id, voter, 0).await.unwrap();
        assert_eq!((likes, dislikes), (0, 0));
        assert_eq!(count_votes_for_pair(&docs, review.id, voter).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_counters_written_onto_review() {
        let (docs, service, review) = setup().await;

        service.vote(review.id, Uuid::new_v4(), 1).await.unwrap();
        service.vote(review.id, Uuid::new_v4(), 1).await.unwrap();
        service.vote(review.id, Uuid::new_v4(), -1).await.unwrap();

        let loaded = get_review(&docs, review.id).await.unwrap().unwrap();
        assert_eq!(loaded.likes, 2);
        assert_eq!(loaded.dislikes, 1);
    }

    #[tokio::test]
    async fn test_out_of_range_value_rejected_without_write() {
        let (docs, service, review) = setup().await;
        let voter = Uuid::new_v4();

        let result = service.vote(review.id, voter, 7).await;
        assert!(matches!(result, Err(Error::InvalidState(_))));
        assert_eq!(count_votes_for_pair(&docs, review.id, voter).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_vote_on_missing_review_is_not_found() {
        let (_docs, service, _review) = setup().await;

        let result = service.vote(Uuid::new_v4(), Uuid::new_v4(), 1).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_clearing_absent_vote_is_ok() {
        let (_docs, service, review) = setup().await;

        let (likes, dislikes) = service.vote(review.id, Uuid::new_v4(), 0).await.unwrap();
        assert_eq!((likes, dislikes), (0, 0));
    }
}
