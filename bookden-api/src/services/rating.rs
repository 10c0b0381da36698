//! Rating aggregator
//!
//! Keeps the denormalized `average_rating` on book rows consistent with the
//! review documents. Reads aggregate from the document store, writes with a
//! single relational update; there is no transaction spanning the two
//! stores, so a failed relational write leaves the aggregate stale until the
//! next rating-affecting mutation or an explicit repair pass.

use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use bookden_common::db::books;
use bookden_common::docstore::reviews;
use bookden_common::Result;

#[derive(Clone)]
pub struct RatingAggregator {
    catalog: SqlitePool,
    docs: SqlitePool,
}

impl RatingAggregator {
    pub fn new(catalog: SqlitePool, docs: SqlitePool) -> Self {
        Self { catalog, docs }
    }

    /// Recompute the mean rating of a book's reviews and write it onto the
    /// book row
    ///
    /// A book with no reviews gets 0.0. If the aggregation read fails the
    /// relational row is left untouched.
    pub async fn recalculate_average(&self, book_id: Uuid) -> Result<()> {
        let average = reviews::average_rating_for_book(&self.docs, book_id).await?;

        let rows = books::update_average_rating(&self.catalog, book_id, average).await?;
        if rows == 0 {
            // Book vanished (deleted concurrently); nothing to keep consistent
            debug!("no live book row {} for aggregate write", book_id);
        }

        Ok(())
    }

    /// Repair pass: recompute the aggregate of every live book
    ///
    /// Maintenance operation for the cross-store staleness window; invoked
    /// explicitly, never from the request path.
    pub async fn recalculate_all(&self) -> Result<usize> {
        let book_ids = books::list_book_ids(&self.catalog).await?;
        let total = book_ids.len();

        for book_id in book_ids {
            self.recalculate_average(book_id).await?;
        }

        info!("recalculated aggregate rating for {} books", total);
        Ok(total)
    }
}
