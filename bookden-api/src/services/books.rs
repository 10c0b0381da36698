//! Book catalog operations
//!
//! CRUD over the relational store, plus the cross-store cleanup a book
//! deletion requires: review documents reference books by value only, so
//! there is no cascade - the documents are removed explicitly after the
//! relational soft-delete commits.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use bookden_common::db::models::{Author, Book};
use bookden_common::db::{authors, books};
use bookden_common::docstore::{reviews, votes};
use bookden_common::roles::Role;
use bookden_common::{Error, Result};

#[derive(Clone)]
pub struct BookService {
    catalog: SqlitePool,
    docs: SqlitePool,
}

impl BookService {
    pub fn new(catalog: SqlitePool, docs: SqlitePool) -> Self {
        Self { catalog, docs }
    }

    /// Create a book linked to existing authors
    ///
    /// Books created by a moderator or admin start confirmed.
    pub async fn create(
        &self,
        title: String,
        description: String,
        cover_image: String,
        author_ids: Vec<Uuid>,
        creator_role: Role,
    ) -> Result<Book> {
        if title.trim().is_empty() {
            return Err(Error::InvalidInput("title must not be empty".to_string()));
        }
        self.require_authors_exist(&author_ids).await?;

        let mut book = Book::new(title, description, cover_image);
        book.confirmed = creator_role.can_moderate();

        books::create_book(&self.catalog, &book, &author_ids).await?;
        Ok(book)
    }

    /// Update a book's fields and, when given, its author links
    pub async fn update(
        &self,
        book_id: Uuid,
        title: String,
        description: String,
        cover_image: String,
        author_ids: Option<Vec<Uuid>>,
    ) -> Result<Book> {
        if title.trim().is_empty() {
            return Err(Error::InvalidInput("title must not be empty".to_string()));
        }
        if let Some(ids) = &author_ids {
            self.require_authors_exist(ids).await?;
        }

        let mut book = self.get(book_id, false).await?;
        book.title = title;
        book.description = description;
        book.cover_image = cover_image;
        book.updated_at = Utc::now();

        books::update_book(&self.catalog, &book, author_ids.as_deref()).await?;
        Ok(book)
    }

    /// Mark a book as confirmed
    pub async fn confirm(&self, book_id: Uuid) -> Result<()> {
        let mut book = self.get(book_id, false).await?;
        book.confirmed = true;
        books::update_book(&self.catalog, &book, None).await?;
        Ok(())
    }

    /// Load a book, optionally restricted to confirmed entries
    pub async fn get(&self, book_id: Uuid, only_confirmed: bool) -> Result<Book> {
        books::get_book(&self.catalog, book_id, only_confirmed)
            .await?
            .ok_or_else(|| Error::NotFound(format!("book {}", book_id)))
    }

    /// Authors linked to a book
    pub async fn authors_of(&self, book_id: Uuid) -> Result<Vec<Author>> {
        let author_ids = books::author_ids_for_book(&self.catalog, book_id).await?;
        authors::get_authors_by_ids(&self.catalog, &author_ids).await
    }

    /// Soft-delete a book, then remove its dependent review and vote
    /// documents from the other store
    ///
    /// Two sequential commits; if the document cleanup fails the relational
    /// delete stands and the leftovers are logged, never rolled back.
    pub async fn delete(&self, book_id: Uuid) -> Result<()> {
        books::soft_delete_book(&self.catalog, book_id).await?;

        match self.delete_review_documents(book_id).await {
            Ok(removed) => {
                info!("deleted book {} and {} review documents", book_id, removed)
            }
            Err(err) => warn!(
                "book {} deleted but review cleanup failed: {}",
                book_id, err
            ),
        }

        Ok(())
    }

    /// Cursor-paginated listing ordered by creation time
    pub async fn list(
        &self,
        limit: i64,
        after: Option<(DateTime<Utc>, Uuid)>,
        only_confirmed: bool,
    ) -> Result<Vec<Book>> {
        books::list_books(&self.catalog, limit, after, only_confirmed).await
    }

    async fn require_authors_exist(&self, author_ids: &[Uuid]) -> Result<()> {
        for author_id in author_ids {
            if authors::get_author(&self.catalog, *author_id).await?.is_none() {
                return Err(Error::NotFound(format!("author {}", author_id)));
            }
        }
        Ok(())
    }

    async fn delete_review_documents(&self, book_id: Uuid) -> Result<u64> {
        let dependent = reviews::list_reviews_for_book(&self.docs, book_id).await?;
        for review in &dependent {
            votes::delete_votes_for_review(&self.docs, review.id).await?;
        }
        reviews::delete_reviews_for_book(&self.docs, book_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookden_common::db::init::init_catalog_schema;
    use bookden_common::docstore::init::init_document_schema;
    use bookden_common::docstore::models::Review;
    use bookden_common::docstore::reviews::{insert_review, list_reviews_for_book};

    async fn setup() -> (SqlitePool, SqlitePool, BookService) {
        let catalog = SqlitePool::connect("sqlite::memory:").await.unwrap();
        init_catalog_schema(&catalog).await.unwrap();
        let docs = SqlitePool::connect("sqlite::memory:").await.unwrap();
        init_document_schema(&docs).await.unwrap();

        let service = BookService::new(catalog.clone(), docs.clone());
        (catalog, docs, service)
    }

    #[tokio::test]
    async fn test_moderator_created_books_start_confirmed() {
        let (_catalog, _docs, service) = setup().await;

        let plain = service
            .create("One".to_string(), String::new(), String::new(), vec![], Role::User)
            .await
            .unwrap();
        let confirmed = service
            .create("Two".to_string(), String::new(), String::new(), vec![], Role::Moderator)
            .await
            .unwrap();

        assert!(!plain.confirmed);
        assert!(confirmed.confirmed);
    }

    #[tokio::test]
    async fn test_unknown_author_rejected() {
        let (_catalog, _docs, service) = setup().await;

        let result = service
            .create(
                "Title".to_string(),
                String::new(),
                String::new(),
                vec![Uuid::new_v4()],
                Role::User,
            )
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_author_links_round_trip() {
        let (catalog, _docs, service) = setup().await;

        let author = Author::new("N. Author".to_string(), String::new());
        authors::create_author(&catalog, &author).await.unwrap();

        let book = service
            .create(
                "Title".to_string(),
                String::new(),
                String::new(),
                vec![author.id],
                Role::User,
            )
            .await
            .unwrap();

        let linked = service.authors_of(book.id).await.unwrap();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].id, author.id);
    }

    #[tokio::test]
    async fn test_delete_removes_review_documents() {
        let (catalog, docs, service) = setup().await;

        let book = service
            .create("Title".to_string(), String::new(), String::new(), vec![], Role::User)
            .await
            .unwrap();
        insert_review(&docs, &Review::new(book.id, Uuid::new_v4(), "t".to_string(), 7))
            .await
            .unwrap();

        service.delete(book.id).await.unwrap();

        // Relational row is soft-deleted, documents are gone
        assert!(books::get_book(&catalog, book.id, false).await.unwrap().is_none());
        assert!(list_reviews_for_book(&docs, book.id).await.unwrap().is_empty());

        // A second delete reports not-found
        assert!(matches!(service.delete(book.id).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_confirmed_only_lookup() {
        let (_catalog, _docs, service) = setup().await;

        let book = service
            .create("Title".to_string(), String::new(), String::new(), vec![], Role::User)
            .await
            .unwrap();

        assert!(matches!(
            service.get(book.id, true).await,
            Err(Error::NotFound(_))
        ));

        service.confirm(book.id).await.unwrap();
        assert!(service.get(book.id, true).await.unwrap().confirmed);
    }

    #[tokio::test]
    async fn test_cursor_pagination_walks_everything_once() {
        let (_catalog, _docs, service) = setup().await;

        for i in 0..5 {
            service
                .create(format!("Book {}", i), String::new(), String::new(), vec![], Role::User)
                .await
                .unwrap();
        }

        let mut seen = Vec::new();
        let mut after = None;
        loop {
            let page = service.list(2, after, false).await.unwrap();
            if page.is_empty() {
                break;
            }
            let last = page.last().unwrap();
            after = Some((last.created_at, last.id));
            seen.extend(page.into_iter().map(|b| b.id));
        }

        assert_eq!(seen.len(), 5);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 5);
    }
}
