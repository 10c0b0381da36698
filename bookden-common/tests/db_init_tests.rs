//! Tests for database initialization
//!
//! Both stores must create their files and schema on first run and reopen
//! existing files without error.

use bookden_common::db::init::init_catalog_db;
use bookden_common::docstore::init::init_document_db;

#[tokio::test]
async fn test_catalog_db_created_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("catalog.db");

    let pool = init_catalog_db(&db_path).await.expect("catalog init failed");
    assert!(db_path.exists(), "catalog database file was not created");

    // Schema is in place
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_catalog_db_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("catalog.db");

    let pool1 = init_catalog_db(&db_path).await.unwrap();
    drop(pool1);

    // Second open must succeed; schema statements are idempotent
    let pool2 = init_catalog_db(&db_path).await;
    assert!(pool2.is_ok(), "failed to reopen catalog db: {:?}", pool2.err());
}

#[tokio::test]
async fn test_document_db_created_with_collections() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("documents.db");

    let pool = init_document_db(&db_path).await.expect("document init failed");
    assert!(db_path.exists());

    for table in ["reviews", "review_votes", "feedback"] {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&pool).await.unwrap();
        assert_eq!(count, 0, "collection {} missing", table);
    }
}

#[tokio::test]
async fn test_stores_are_separate_files() {
    let dir = tempfile::tempdir().unwrap();

    let catalog = init_catalog_db(&dir.path().join("catalog.db")).await.unwrap();
    let _docs = init_document_db(&dir.path().join("documents.db")).await.unwrap();

    // The catalog database knows nothing about document collections
    let result: Result<i64, _> = sqlx::query_scalar("SELECT COUNT(*) FROM reviews")
        .fetch_one(&catalog)
        .await;
    assert!(result.is_err(), "stores must not share a database file");
}
