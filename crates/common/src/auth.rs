//! JWT access-token helpers.
//!
//! The HTTP layer authenticates callers with a short-lived HS256 token
//! carrying the user id; everything below the HTTP layer only ever sees the
//! already-resolved actor identity.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the authenticated user id.
    pub sub: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Issue an access token for a user.
pub fn issue_token(user_id: &str, secret: &str, expire_secs: i64) -> AppResult<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + expire_secs,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to encode token: {e}")))
}

/// Verify an access token and return its claims.
///
/// Expired or otherwise invalid tokens yield [`AppError::Unauthorized`].
pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_issue_and_verify_round_trip() {
        let token = issue_token("user1", SECRET, 3600).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, "user1");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = issue_token("user1", SECRET, 3600).unwrap();
        let result = verify_token(&token, "other-secret");

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        // Expired an hour ago; default validation applies some leeway, so
        // back-date well past it.
        let token = issue_token("user1", SECRET, -3600).unwrap();
        let result = verify_token(&token, SECRET);

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
