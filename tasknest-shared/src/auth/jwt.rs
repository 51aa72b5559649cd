/// JWT access tokens
///
/// Tokens are HS256-signed and carry the full request identity (user id,
/// email, username), so authenticated handlers never need a user lookup to
/// know who is calling.
///
/// # Claims
///
/// ```json
/// {
///   "sub": "5f0c...",          // user id
///   "iss": "tasknest",
///   "iat": 1700000000,
///   "nbf": 1700000000,
///   "exp": 1700604800,
///   "email": "ada@example.com",
///   "username": "ada"
/// }
/// ```
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use tasknest_shared::auth::jwt::{create_token, validate_token, Claims};
/// use uuid::Uuid;
///
/// let secret = "a-test-secret-that-is-at-least-32-chars";
/// let claims = Claims::new(Uuid::new_v4(), "ada@example.com", "ada", Duration::days(7));
/// let token = create_token(&claims, secret).unwrap();
///
/// let decoded = validate_token(&token, secret).unwrap();
/// assert_eq!(decoded.sub, claims.sub);
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer written into and required from every token
pub const ISSUER: &str = "tasknest";

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to create token: {0}")]
    CreateError(String),

    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token issuer")]
    InvalidIssuer,
}

/// Signing secret and lifetime for issued tokens
#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub expiration: Duration,
}

impl JwtSettings {
    pub fn new(secret: impl Into<String>, expiration: Duration) -> Self {
        Self {
            secret: secret.into(),
            expiration,
        }
    }

    /// Issues a signed token for the given identity
    pub fn issue(&self, user_id: Uuid, email: &str, username: &str) -> Result<String, JwtError> {
        let claims = Claims::new(user_id, email, username, self.expiration);
        create_token(&claims, &self.secret)
    }

    /// Human-readable lifetime, e.g. `7d` or `12h`
    pub fn expires_in(&self) -> String {
        let hours = self.expiration.num_hours();
        if hours > 0 && hours % 24 == 0 {
            format!("{}d", hours / 24)
        } else if hours > 0 {
            format!("{}h", hours)
        } else {
            format!("{}s", self.expiration.num_seconds())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,

    pub iss: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,

    pub email: String,
    pub username: String,
}

impl Claims {
    pub fn new(user_id: Uuid, email: &str, username: &str, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            email: email.to_string(),
            username: username.to_string(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| JwtError::CreateError(e.to_string()))
}

/// Verifies signature, issuer, `exp` and `nbf`, and returns the claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => JwtError::Expired,
        ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(e.to_string()),
    })?;

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-that-is-long-enough-32";

    fn claims() -> Claims {
        Claims::new(Uuid::new_v4(), "ada@example.com", "ada", Duration::days(7))
    }

    #[test]
    fn test_roundtrip_keeps_identity() {
        let claims = claims();
        let token = create_token(&claims, SECRET).unwrap();
        let decoded = validate_token(&token, SECRET).unwrap();

        assert_eq!(decoded, claims);
        assert_eq!(decoded.iss, "tasknest");
        assert!(!decoded.is_expired());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token(&claims(), SECRET).unwrap();
        assert!(matches!(
            validate_token(&token, "another-secret-that-is-also-long-enough"),
            Err(JwtError::ValidationError(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let expired = Claims::new(Uuid::new_v4(), "a@b.c", "abc", Duration::hours(-2));
        assert!(expired.is_expired());

        let token = create_token(&expired, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let mut foreign = claims();
        foreign.iss = "someone-else".to_string();

        let token = create_token(&foreign, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::InvalidIssuer)));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(validate_token("not.a.jwt", SECRET).is_err());
        assert!(validate_token("", SECRET).is_err());
    }

    #[test]
    fn test_settings_expires_in() {
        assert_eq!(JwtSettings::new(SECRET, Duration::days(7)).expires_in(), "7d");
        assert_eq!(JwtSettings::new(SECRET, Duration::hours(12)).expires_in(), "12h");
    }

    #[test]
    fn test_settings_issue() {
        let settings = JwtSettings::new(SECRET, Duration::hours(1));
        let user_id = Uuid::new_v4();
        let token = settings.issue(user_id, "ada@example.com", "ada").unwrap();

        let decoded = validate_token(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, user_id);
        assert_eq!(decoded.username, "ada");
    }
}
