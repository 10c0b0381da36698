//! Relational (catalog) store: models and queries

pub mod authors;
pub mod books;
pub mod init;
pub mod models;
pub mod refresh_tokens;
pub mod user_books;
pub mod users;

pub use init::*;
pub use models::*;
