//! Review lifecycle
//!
//! Create, edit, and delete review documents, maintain the append-only edit
//! history, and trigger the rating aggregator when a mutation changes the
//! rating. A review mutation and the aggregate recalculation are two
//! independent commits: when the recalculation fails after the mutation has
//! committed, the mutation stands and the staleness is logged at warn.
//!
//! Authorization (author / moderator / admin) is enforced by the HTTP layer
//! before calling in here.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use bookden_common::docstore::models::{Review, ReviewVersion};
use bookden_common::docstore::{reviews, votes};
use bookden_common::{Error, Result};

use crate::services::rating::RatingAggregator;

/// Reject ratings outside the 1-10 domain
fn validate_rating(rating: i64) -> Result<()> {
    if !(1..=10).contains(&rating) {
        return Err(Error::InvalidInput(format!(
            "rating must be between 1 and 10, got {}",
            rating
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ReviewService {
    docs: SqlitePool,
    ratings: RatingAggregator,
}

impl ReviewService {
    pub fn new(docs: SqlitePool, ratings: RatingAggregator) -> Self {
        Self { docs, ratings }
    }

    /// Insert a new review with empty version history, then recalculate the
    /// book's aggregate
    pub async fn create(
        &self,
        book_id: Uuid,
        text: String,
        rating: i64,
        author_id: Uuid,
    ) -> Result<Review> {
        validate_rating(rating)?;

        let review = Review::new(book_id, author_id, text, rating);
        reviews::insert_review(&self.docs, &review).await?;

        self.recalculate_after(book_id, "review create").await;
        Ok(review)
    }

    /// Edit a review's text and rating
    ///
    /// The prior text is appended to the version history regardless of
    /// whether it changed; the aggregator runs only when the rating changed.
    pub async fn edit(
        &self,
        review_id: Uuid,
        new_text: String,
        new_rating: i64,
        editor_id: Uuid,
    ) -> Result<Review> {
        validate_rating(new_rating)?;

        let existing = reviews::get_review(&self.docs, review_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("review {}", review_id)))?;

        let rating_changed = existing.rating != new_rating;

        let mut versions = existing.versions.clone();
        versions.push(ReviewVersion {
            text: existing.text.clone(),
            edited_at: existing.updated_at,
            edited_by: editor_id,
        });

        let updated_at = Utc::now();
        let rows = reviews::apply_edit(
            &self.docs,
            review_id,
            &new_text,
            new_rating,
            &versions,
            updated_at,
        )
        .await?;
        if rows == 0 {
            // Deleted between the read and the write
            return Err(Error::NotFound(format!("review {}", review_id)));
        }

        if rating_changed {
            self.recalculate_after(existing.book_id, "review edit").await;
        }

        Ok(Review {
            text: new_text,
            rating: new_rating,
            versions,
            updated_at,
            ..existing
        })
    }

    /// Delete a review (and its vote documents), then recalculate the book's
    /// aggregate
    pub async fn delete(&self, review_id: Uuid) -> Result<()> {
        let existing = reviews::get_review(&self.docs, review_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("review {}", review_id)))?;

        let rows = reviews::delete_review(&self.docs, review_id).await?;
        if rows == 0 {
            return Err(Error::NotFound(format!("review {}", review_id)));
        }

        if let Err(err) = votes::delete_votes_for_review(&self.docs, review_id).await {
            warn!("failed to remove votes of deleted review {}: {}", review_id, err);
        }

        self.recalculate_after(existing.book_id, "review delete").await;
        Ok(())
    }

    /// Load a review by id
    pub async fn get(&self, review_id: Uuid) -> Result<Review> {
        reviews::get_review(&self.docs, review_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("review {}", review_id)))
    }

    /// All reviews for a book, oldest first
    pub async fn list_for_book(&self, book_id: Uuid) -> Result<Vec<Review>> {
        reviews::list_reviews_for_book(&self.docs, book_id).await
    }

    /// Run the aggregator after a committed mutation
    ///
    /// Failure here does not roll anything back; the aggregate lags until
    /// the next trigger or a repair pass.
    async fn recalculate_after(&self, book_id: Uuid, operation: &str) {
        if let Err(err) = self.ratings.recalculate_average(book_id).await {
            let condition = Error::PartialConsistency(format!(
                "aggregate recalculation failed after {} for book {}: {}",
                operation, book_id, err
            ));
            warn!("{}", condition);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookden_common::db::books;
    use bookden_common::db::init::init_catalog_schema;
    use bookden_common::db::models::Book;
    use bookden_common::docstore::init::init_document_schema;

    async fn setup() -> (SqlitePool, SqlitePool, ReviewService, Book) {
        let catalog = SqlitePool::connect("sqlite::memory:").await.unwrap();
        init_catalog_schema(&catalog).await.unwrap();
        let docs = SqlitePool::connect("sqlite::memory:").await.unwrap();
        init_document_schema(&docs).await.unwrap();

        let book = Book::new("Title".to_string(), String::new(), String::new());
        books::create_book(&catalog, &book, &[]).await.unwrap();

        let ratings = RatingAggregator::new(catalog.clone(), docs.clone());
        let service = ReviewService::new(docs.clone(), ratings);
        (catalog, docs, service, book)
    }

    async fn book_average(catalog: &SqlitePool, book_id: Uuid) -> f64 {
        books::get_book(catalog, book_id, false)
            .await
            .unwrap()
            .unwrap()
            .average_rating
    }

    #[tokio::test]
    async fn test_create_updates_aggregate() {
        let (catalog, _docs, service, book) = setup().await;

        service
            .create(book.id, "good".to_string(), 6, Uuid::new_v4())
            .await
            .unwrap();
        service
            .create(book.id, "great".to_string(), 10, Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(book_average(&catalog, book.id).await, 8.0);
    }

    #[tokio::test]
    async fn test_create_rejects_out_of_range_rating() {
        let (_catalog, _docs, service, book) = setup().await;

        let result = service.create(book.id, "bad".to_string(), 0, Uuid::new_v4()).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let result = service.create(book.id, "bad".to_string(), 11, Uuid::new_v4()).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_text_only_edit_appends_one_version_and_keeps_aggregate() {
        let (catalog, _docs, service, book) = setup().await;
        let author = Uuid::new_v4();

        let review = service.create(book.id, "first".to_string(), 8, author).await.unwrap();

        // Corrupt the aggregate to detect an unwanted recalculation
        books::update_average_rating(&catalog, book.id, 3.0).await.unwrap();

        let edited = service
            .edit(review.id, "second".to_string(), 8, author)
            .await
            .unwrap();

        assert_eq!(edited.versions.len(), 1);
        assert_eq!(edited.versions[0].text, "first");
        // Rating unchanged: the aggregator must not have run
        assert_eq!(book_average(&catalog, book.id).await, 3.0);
    }

    #[tokio::test]
    async fn test_rating_edit_appends_version_and_recalculates() {
        let (catalog, _docs, service, book) = setup().await;
        let author = Uuid::new_v4();

        let review = service.create(book.id, "text".to_string(), 8, author).await.unwrap();

        // Rating-only edit: text is unchanged but still snapshotted
        let edited = service.edit(review.id, "text".to_string(), 10, author).await.unwrap();

        assert_eq!(edited.versions.len(), 1);
        assert_eq!(edited.versions[0].text, "text");
        assert_eq!(book_average(&catalog, book.id).await, 10.0);
    }

    #[tokio::test]
    async fn test_delete_recalculates_and_missing_is_not_found() {
        let (catalog, _docs, service, book) = setup().await;

        let kept = service.create(book.id, "keep".to_string(), 10, Uuid::new_v4()).await.unwrap();
        let gone = service.create(book.id, "drop".to_string(), 6, Uuid::new_v4()).await.unwrap();
        assert_eq!(book_average(&catalog, book.id).await, 8.0);

        service.delete(gone.id).await.unwrap();
        assert_eq!(book_average(&catalog, book.id).await, 10.0);

        let result = service.delete(gone.id).await;
        assert!(matches!(result, Err(Error::NotFound(_))));

        assert_eq!(service.get(kept.id).await.unwrap().text, "keep");
    }

    #[tokio::test]
    async fn test_review_sequence_recomputes_average() {
        // Reviews rated [6, 8, 10] -> 8.0; delete the 6 -> 9.0; edit the 8
        // to 10 (text unchanged) -> 10.0 with one version entry
        let (catalog, _docs, service, book) = setup().await;
        let author = Uuid::new_v4();

        let r6 = service.create(book.id, "ok".to_string(), 6, author).await.unwrap();
        let r8 = service.create(book.id, "good".to_string(), 8, author).await.unwrap();
        let _r10 = service.create(book.id, "great".to_string(), 10, author).await.unwrap();
        assert_eq!(book_average(&catalog, book.id).await, 8.0);

        service.delete(r6.id).await.unwrap();
        assert_eq!(book_average(&catalog, book.id).await, 9.0);

        let edited = service.edit(r8.id, "good".to_string(), 10, author).await.unwrap();
        assert_eq!(book_average(&catalog, book.id).await, 10.0);
        assert_eq!(edited.versions.len(), 1);
        assert_eq!(edited.versions[0].text, "good");
    }
}
