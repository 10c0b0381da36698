//! Document store: review, vote, and feedback collections
//!
//! A second, independent SQLite database. Rows here are documents: they
//! reference catalog rows by identifier value only (no foreign keys across
//! stores) and carry loosely-structured JSON where the shape is open-ended.
//! No multi-document transactions are used.

pub mod feedback;
pub mod init;
pub mod models;
pub mod reviews;
pub mod votes;

pub use init::*;
pub use models::*;
