//! User accounts
//!
//! Registration and login; token issuance is delegated to the session
//! manager. Login failures use one message for both unknown email and wrong
//! password.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use bookden_common::auth::password;
use bookden_common::db::models::User;
use bookden_common::db::users;
use bookden_common::roles::Role;
use bookden_common::{Error, Result};

use crate::services::sessions::{SessionManager, TokenPair};

#[derive(Clone)]
pub struct UserService {
    catalog: SqlitePool,
    sessions: SessionManager,
}

impl UserService {
    pub fn new(catalog: SqlitePool, sessions: SessionManager) -> Self {
        Self { catalog, sessions }
    }

    /// Register a new account with the default role
    pub async fn register(&self, username: String, email: String, pass: String) -> Result<User> {
        if username.trim().is_empty() {
            return Err(Error::InvalidInput("username must not be empty".to_string()));
        }
        if email.trim().is_empty() || !email.contains('@') {
            return Err(Error::InvalidInput("email is malformed".to_string()));
        }
        if pass.len() < 8 {
            return Err(Error::InvalidInput(
                "password must be at least 8 characters".to_string(),
            ));
        }

        if users::get_user_by_email(&self.catalog, &email).await?.is_some() {
            return Err(Error::InvalidInput("email already registered".to_string()));
        }

        let (password_hash, password_salt) = password::hash_password(&pass);
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            password_salt,
            role: Role::User,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };

        users::create_user(&self.catalog, &user).await?;
        info!("registered user {}", user.id);
        Ok(user)
    }

    /// Verify credentials and open a session
    pub async fn login(&self, email: &str, pass: &str) -> Result<TokenPair> {
        let user = users::get_user_by_email(&self.catalog, email)
            .await?
            .ok_or_else(|| Error::InvalidInput("invalid email or password".to_string()))?;

        if !password::verify_password(pass, &user.password_hash, &user.password_salt) {
            return Err(Error::InvalidInput("invalid email or password".to_string()));
        }

        self.sessions.issue_session(user.id, user.role).await
    }

    /// Load a user's profile
    pub async fn get_user(&self, user_id: Uuid) -> Result<User> {
        users::get_user_by_id(&self.catalog, user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("user {}", user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookden_common::db::init::init_catalog_schema;

    async fn setup() -> UserService {
        let catalog = SqlitePool::connect("sqlite::memory:").await.unwrap();
        init_catalog_schema(&catalog).await.unwrap();

        let sessions =
            SessionManager::new(catalog.clone(), "test_secret".to_string(), 900, 604_800);
        UserService::new(catalog, sessions)
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let service = setup().await;

        let user = service
            .register(
                "reader".to_string(),
                "reader@example.com".to_string(),
                "correct horse".to_string(),
            )
            .await
            .unwrap();
        assert_eq!(user.role, Role::User);

        let pair = service.login("reader@example.com", "correct horse").await.unwrap();
        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let service = setup().await;

        service
            .register(
                "first".to_string(),
                "dup@example.com".to_string(),
                "password-one".to_string(),
            )
            .await
            .unwrap();

        let result = service
            .register(
                "second".to_string(),
                "dup@example.com".to_string(),
                "password-two".to_string(),
            )
            .await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_login_failures_share_one_message() {
        let service = setup().await;

        service
            .register(
                "reader".to_string(),
                "reader@example.com".to_string(),
                "correct horse".to_string(),
            )
            .await
            .unwrap();

        let unknown = service.login("nobody@example.com", "whatever").await;
        let wrong = service.login("reader@example.com", "wrong pass").await;

        let unknown_msg = unknown.unwrap_err().to_string();
        let wrong_msg = wrong.unwrap_err().to_string();
        assert_eq!(unknown_msg, wrong_msg);
    }
}
