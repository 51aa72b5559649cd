/// Bearer-token authentication
///
/// Resolves the `Authorization: Bearer <jwt>` header into an [`AuthUser`].
/// The token's identity is trusted as-is; no user lookup happens here. The
/// API crate wraps [`authenticate`] in an axum middleware that inserts the
/// resulting `AuthUser` into request extensions.
///
/// # Example
///
/// ```
/// use axum::http::HeaderMap;
/// use tasknest_shared::auth::middleware::{authenticate, AuthError};
///
/// let headers = HeaderMap::new();
/// assert!(matches!(
///     authenticate(&headers, "secret"),
///     Err(AuthError::MissingCredentials)
/// ));
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_token, Claims, JwtError};

/// Authenticated caller identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            username: claims.username,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingCredentials,

    #[error("Expected Bearer token")]
    InvalidFormat,

    #[error("{0}")]
    InvalidToken(String),
}

/// Extracts and validates the bearer token from request headers
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthUser, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::InvalidFormat)?;

    let claims = validate_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        other => AuthError::InvalidToken(format!("Invalid token: {}", other)),
    })?;

    Ok(claims.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::create_token;
    use axum::http::HeaderValue;
    use chrono::Duration;

    const SECRET: &str = "middleware-test-secret-long-enough-32";

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn test_valid_token_yields_identity() {
        let claims = Claims::new(Uuid::new_v4(), "ada@example.com", "ada", Duration::hours(1));
        let token = create_token(&claims, SECRET).unwrap();

        let user = authenticate(&bearer(&token), SECRET).unwrap();
        assert_eq!(user.user_id, claims.sub);
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.username, "ada");
    }

    #[test]
    fn test_missing_and_malformed_headers() {
        assert!(matches!(
            authenticate(&HeaderMap::new(), SECRET),
            Err(AuthError::MissingCredentials)
        ));

        let mut basic = HeaderMap::new();
        basic.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(matches!(authenticate(&basic, SECRET), Err(AuthError::InvalidFormat)));

        assert!(matches!(
            authenticate(&bearer(""), SECRET),
            Err(AuthError::InvalidFormat)
        ));
    }

    #[test]
    fn test_expired_token() {
        let claims = Claims::new(Uuid::new_v4(), "a@b.c", "abc", Duration::hours(-3));
        let token = create_token(&claims, SECRET).unwrap();

        let err = authenticate(&bearer(&token), SECRET).unwrap_err();
        assert_eq!(err.to_string(), "Token expired");
    }
}
