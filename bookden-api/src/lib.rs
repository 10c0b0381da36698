//! bookden-api library - book catalog service
//!
//! HTTP surface over the catalog (relational) and document stores, plus the
//! engine that keeps the denormalized book ratings consistent with review
//! and vote mutations and rotates refresh tokens.

use axum::routing::{delete, get, post, put};
use axum::{middleware, Router};
use sqlx::SqlitePool;

use bookden_common::config::Config;

pub mod api;
pub mod services;

use services::books::BookService;
use services::rating::RatingAggregator;
use services::reviews::ReviewService;
use services::sessions::SessionManager;
use services::users::UserService;
use services::votes::VoteService;

/// Application state shared across HTTP handlers
///
/// Every component receives its store handles at construction; there is no
/// process-wide mutable state outside the two pools.
#[derive(Clone)]
pub struct AppState {
    /// Relational catalog store
    pub catalog: SqlitePool,
    /// Document store
    pub docs: SqlitePool,
    /// HMAC secret for access-token validation in the auth middleware
    pub jwt_secret: String,
    pub ratings: RatingAggregator,
    pub reviews: ReviewService,
    pub votes: VoteService,
    pub sessions: SessionManager,
    pub books: BookService,
    pub users: UserService,
}

impl AppState {
    /// Wire up all components against the two store pools
    pub fn new(catalog: SqlitePool, docs: SqlitePool, config: &Config) -> Self {
        let ratings = RatingAggregator::new(catalog.clone(), docs.clone());
        let reviews = ReviewService::new(docs.clone(), ratings.clone());
        let votes = VoteService::new(docs.clone());
        let sessions = SessionManager::new(
            catalog.clone(),
            config.jwt_secret.clone(),
            config.access_ttl_secs,
            config.refresh_ttl_secs,
        );
        let users = UserService::new(catalog.clone(), sessions.clone());
        let books = BookService::new(catalog.clone(), docs.clone());

        Self {
            catalog,
            docs,
            jwt_secret: config.jwt_secret.clone(),
            ratings,
            reviews,
            votes,
            sessions,
            books,
            users,
        }
    }
}

/// Build application router
///
/// Public routes cover reads and the auth entry points; everything mutating
/// goes through the bearer-token middleware.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .merge(api::health::routes())
        .route("/auth/register", post(api::users::register))
        .route("/auth/login", post(api::users::login))
        .route("/auth/refresh", post(api::users::refresh))
        .route("/books", get(api::books::list_books))
        .route("/books/:id", get(api::books::get_book))
        .route("/books/:id/reviews", get(api::reviews::list_for_book))
        .route("/authors", get(api::authors::list_authors))
        .route("/authors/:id", get(api::authors::get_author));

    let protected = Router::new()
        .route("/auth/logout", post(api::users::logout))
        .route("/books", post(api::books::create_book))
        .route("/books/:id", put(api::books::update_book))
        .route("/books/:id", delete(api::books::delete_book))
        .route("/books/:id/confirm", post(api::books::confirm_book))
        .route("/books/:id/reviews", post(api::reviews::create_review))
        .route("/reviews/:id", put(api::reviews::edit_review))
        .route("/reviews/:id", delete(api::reviews::delete_review))
        .route("/reviews/:id/vote", post(api::reviews::vote_review))
        .route("/authors", post(api::authors::create_author))
        .route("/authors/:id", put(api::authors::update_author))
        .route("/authors/:id", delete(api::authors::delete_author))
        .route("/users/me", get(api::users::me))
        .route("/users/me/books", get(api::progress::list_progress))
        .route("/users/me/books", put(api::progress::upsert_progress))
        .route("/users/me/books/:book_id", delete(api::progress::delete_progress))
        .route("/feedback", post(api::feedback::create_feedback))
        .route("/feedback", get(api::feedback::list_feedback))
        .route("/feedback/:id/check", post(api::feedback::check_feedback))
        .route("/maintenance/recalculate-ratings", post(api::books::recalculate_ratings))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
