//! Signed, time-bound token issuance and validation (HS256)
//!
//! Both access and refresh credentials use the same claim shape: the subject
//! (user id), the role, and an expiry. Validation recovers the embedded
//! subject/role or fails; expiry is enforced by the decoder.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::Role;
use crate::{Error, Result};

/// Claims embedded in every issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id
    pub sub: Uuid,
    /// Role at issuance time
    pub role: Role,
    /// Expiry as Unix seconds
    pub exp: i64,
    /// Unique token id; two tokens for the same subject never serialize to
    /// the same string even within one second
    pub jti: Uuid,
}

/// Issue a signed token for `user_id` that expires `ttl_secs` from now
pub fn issue_token(user_id: Uuid, role: Role, ttl_secs: i64, secret: &str) -> Result<String> {
    let expires_at = Utc::now() + Duration::seconds(ttl_secs);
    let claims = Claims {
        sub: user_id,
        role,
        exp: expires_at.timestamp(),
        jti: Uuid::new_v4(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Validate a token and recover its claims
///
/// An expired token maps to `InvalidState`; any other decode failure maps to
/// the wrapped token error.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims> {
    let validation = Validation::new(Algorithm::HS256);

    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => Ok(data.claims),
        Err(err) if matches!(err.kind(), jsonwebtoken::errors::ErrorKind::ExpiredSignature) => {
            Err(Error::InvalidState("token expired".to_string()))
        }
        Err(err) => Err(Error::Token(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_validate() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, Role::Moderator, 60, "test_secret").unwrap();

        let claims = validate_token(&token, "test_secret").unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Role::Moderator);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(Uuid::new_v4(), Role::User, 60, "right_secret").unwrap();

        let result = validate_token(&token, "wrong_secret");
        assert!(matches!(result, Err(Error::Token(_))));
    }

    #[test]
    fn test_expired_token_rejected_as_invalid_state() {
        // Already past expiry; decoder default leeway is 60s, so go well past
        let token = issue_token(Uuid::new_v4(), Role::User, -120, "test_secret").unwrap();

        let result = validate_token(&token, "test_secret");
        assert!(matches!(result, Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_tokens_distinct_within_one_second() {
        let user_id = Uuid::new_v4();
        let a = issue_token(user_id, Role::User, 60, "test_secret").unwrap();
        let b = issue_token(user_id, Role::User, 60, "test_secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_token_rejected() {
        let result = validate_token("not-a-token", "test_secret");
        assert!(matches!(result, Err(Error::Token(_))));
    }
}
