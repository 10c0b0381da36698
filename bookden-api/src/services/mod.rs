//! Service components
//!
//! Each component owns its store handles (injected at construction) and
//! exposes the idempotent operations the HTTP layer calls into.

pub mod books;
pub mod rating;
pub mod reviews;
pub mod sessions;
pub mod users;
pub mod votes;
