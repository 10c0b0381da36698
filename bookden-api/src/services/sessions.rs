//! Session and refresh-token management
//!
//! Issues signed access/refresh pairs, rotates refresh tokens on use, and
//! sweeps expired rows on an interval. A refresh token is single-use: the
//! stored row is deleted when consumed, so a second refresh with the same
//! value observes "not found" - a possible replay, never retried silently.

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use bookden_common::auth::jwt;
use bookden_common::db::models::RefreshToken;
use bookden_common::db::refresh_tokens;
use bookden_common::roles::Role;
use bookden_common::{Error, Result};

/// Freshly issued credential pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct SessionManager {
    catalog: SqlitePool,
    jwt_secret: String,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl SessionManager {
    pub fn new(
        catalog: SqlitePool,
        jwt_secret: String,
        access_ttl_secs: i64,
        refresh_ttl_secs: i64,
    ) -> Self {
        Self {
            catalog,
            jwt_secret,
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    /// Issue an access/refresh pair; only the refresh credential is persisted
    pub async fn issue_session(&self, user_id: Uuid, role: Role) -> Result<TokenPair> {
        let access_token = jwt::issue_token(user_id, role, self.access_ttl_secs, &self.jwt_secret)?;
        let refresh_token =
            jwt::issue_token(user_id, role, self.refresh_ttl_secs, &self.jwt_secret)?;

        let record = RefreshToken {
            id: Uuid::new_v4(),
            user_id,
            token: refresh_token.clone(),
            expires_at: Utc::now() + Duration::seconds(self.refresh_ttl_secs),
        };
        refresh_tokens::insert_token(&self.catalog, &record).await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Rotate a refresh token: validate, delete the consumed row, persist a
    /// replacement
    ///
    /// An absent row is `NotFound` whether the token never existed or was
    /// already consumed; distinguishing the two would tell a replaying
    /// attacker which tokens were once real.
    pub async fn refresh(&self, old_token: &str) -> Result<TokenPair> {
        let stored = refresh_tokens::get_by_token(&self.catalog, old_token)
            .await?
            .ok_or_else(|| Error::NotFound("refresh token".to_string()))?;

        if stored.expires_at < Utc::now() {
            // Stale row the sweeper has not reached yet
            refresh_tokens::delete_by_token(&self.catalog, old_token).await?;
            return Err(Error::InvalidState("refresh token expired".to_string()));
        }

        let claims = jwt::validate_token(old_token, &self.jwt_secret)?;

        let access_token =
            jwt::issue_token(claims.sub, claims.role, self.access_ttl_secs, &self.jwt_secret)?;
        let new_refresh =
            jwt::issue_token(claims.sub, claims.role, self.refresh_ttl_secs, &self.jwt_secret)?;

        // Consume before persisting the replacement. Two concurrent refresh
        // attempts both reach this point; only the one that actually deletes
        // the row wins, the loser surfaces as a replay.
        let removed = refresh_tokens::delete_by_token(&self.catalog, old_token).await?;
        if removed == 0 {
            return Err(Error::NotFound("refresh token".to_string()));
        }

        let record = RefreshToken {
            id: Uuid::new_v4(),
            user_id: claims.sub,
            token: new_refresh.clone(),
            expires_at: Utc::now() + Duration::seconds(self.refresh_ttl_secs),
        };
        refresh_tokens::insert_token(&self.catalog, &record).await?;

        Ok(TokenPair {
            access_token,
            refresh_token: new_refresh,
        })
    }

    /// Revoke a stored refresh token (logout)
    ///
    /// Idempotent: revoking an unknown or already-consumed token is not an
    /// error.
    pub async fn revoke(&self, token: &str) -> Result<()> {
        refresh_tokens::delete_by_token(&self.catalog, token).await?;
        Ok(())
    }

    /// Delete all refresh rows whose expiry is strictly before `now`
    ///
    /// Separated from the timer loop so tests drive it with a fixed clock.
    pub async fn sweep_once(&self, now: DateTime<Utc>) -> Result<u64> {
        refresh_tokens::delete_expired(&self.catalog, now).await
    }

    /// Recurring sweep until cancelled
    ///
    /// Best-effort janitor: failures are logged and the next tick retries;
    /// expired tokens are rejected at refresh time regardless.
    pub async fn run_sweeper(self, interval: std::time::Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("token sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    match self.sweep_once(Utc::now()).await {
                        Ok(0) => {}
                        Ok(swept) => info!("swept {} expired refresh tokens", swept),
                        Err(err) => warn!("token sweep failed: {}", err),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookden_common::db::init::init_catalog_schema;
    use bookden_common::db::models::User;

    async fn setup() -> (SqlitePool, SessionManager, Uuid) {
        let catalog = SqlitePool::connect("sqlite::memory:").await.unwrap();
        init_catalog_schema(&catalog).await.unwrap();

        // Refresh rows reference users; seed one
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let user = User {
            id: user_id,
            username: "reader".to_string(),
            email: "reader@example.com".to_string(),
            password_hash: String::new(),
            password_salt: String::new(),
            role: Role::User,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        bookden_common::db::users::create_user(&catalog, &user).await.unwrap();

        let manager = SessionManager::new(catalog.clone(), "test_secret".to_string(), 900, 604_800);
        (catalog, manager, user_id)
    }

    async fn token_count(catalog: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM refresh_tokens")
            .fetch_one(catalog)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_issue_persists_only_refresh_token() {
        let (catalog, manager, user_id) = setup().await;

        let pair = manager.issue_session(user_id, Role::User).await.unwrap();
        assert_ne!(pair.access_token, pair.refresh_token);

        assert_eq!(token_count(&catalog).await, 1);
        let stored = refresh_tokens::get_by_token(&catalog, &pair.refresh_token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.user_id, user_id);

        // The access token is never stored
        let access_row = refresh_tokens::get_by_token(&catalog, &pair.access_token)
            .await
            .unwrap();
        assert!(access_row.is_none());
    }

    #[tokio::test]
    async fn test_refresh_rotates_and_consumes() {
        let (catalog, manager, user_id) = setup().await;

        let pair = manager.issue_session(user_id, Role::Moderator).await.unwrap();
        let rotated = manager.refresh(&pair.refresh_token).await.unwrap();

        // New refresh row replaced the consumed one
        assert_eq!(token_count(&catalog).await, 1);
        assert_ne!(rotated.refresh_token, pair.refresh_token);

        // Role survives rotation
        let claims =
            jwt::validate_token(&rotated.access_token, "test_secret").unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Role::Moderator);

        // Replay of the consumed token fails as not-found
        let replay = manager.refresh(&pair.refresh_token).await;
        assert!(matches!(replay, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_revoked_token_cannot_refresh() {
        let (catalog, manager, user_id) = setup().await;

        let pair = manager.issue_session(user_id, Role::User).await.unwrap();
        manager.revoke(&pair.refresh_token).await.unwrap();
        assert_eq!(token_count(&catalog).await, 0);

        let result = manager.refresh(&pair.refresh_token).await;
        assert!(matches!(result, Err(Error::NotFound(_))));

        // Revoking again is a no-op
        manager.revoke(&pair.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_token_is_not_found() {
        let (_catalog, manager, _user_id) = setup().await;

        let result = manager.refresh("never-issued").await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_expired_row_rejected_and_deleted() {
        let (catalog, manager, user_id) = setup().await;

        let pair = manager.issue_session(user_id, Role::User).await.unwrap();

        // Age the stored row past expiry
        sqlx::query("UPDATE refresh_tokens SET expires_at = ? WHERE token = ?")
            .bind(Utc::now() - Duration::hours(1))
            .bind(&pair.refresh_token)
            .execute(&catalog)
            .await
            .unwrap();

        let result = manager.refresh(&pair.refresh_token).await;
        assert!(matches!(result, Err(Error::InvalidState(_))));

        // The stale row was removed as a side effect
        assert_eq!(token_count(&catalog).await, 0);
    }

    #[tokio::test]
    async fn test_sweep_removes_exactly_expired_rows() {
        let (catalog, manager, user_id) = setup().await;

        let live = manager.issue_session(user_id, Role::User).await.unwrap();
        let dead = manager.issue_session(user_id, Role::User).await.unwrap();

        let now = Utc::now();
        sqlx::query("UPDATE refresh_tokens SET expires_at = ? WHERE token = ?")
            .bind(now - Duration::seconds(1))
            .bind(&dead.refresh_token)
            .execute(&catalog)
            .await
            .unwrap();

        let swept = manager.sweep_once(now).await.unwrap();
        assert_eq!(swept, 1);

        assert!(refresh_tokens::get_by_token(&catalog, &live.refresh_token)
            .await
            .unwrap()
            .is_some());
        assert!(refresh_tokens::get_by_token(&catalog, &dead.refresh_token)
            .await
            .unwrap()
            .is_none());

        // Idempotent: a second pass at the same instant removes nothing
        assert_eq!(manager.sweep_once(now).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sweeper_task_stops_on_cancel() {
        let (_catalog, manager, _user_id) = setup().await;

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(
            manager.run_sweeper(std::time::Duration::from_secs(3600), cancel.clone()),
        );

        cancel.cancel();
        handle.await.unwrap();
    }
}
