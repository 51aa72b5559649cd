/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength rules
/// - [`jwt`]: HS256 access tokens carrying the caller identity
/// - [`middleware`]: bearer-token resolution into an [`middleware::AuthUser`]
///
/// # Example
///
/// ```no_run
/// use chrono::Duration;
/// use tasknest_shared::auth::jwt::JwtSettings;
/// use tasknest_shared::auth::password::{hash_password, verify_password};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Sup3rSecret")?;
/// assert!(verify_password("Sup3rSecret", &hash)?);
///
/// let jwt = JwtSettings::new("a-secret-of-at-least-thirty-two-chars", Duration::days(7));
/// let token = jwt.issue(Uuid::new_v4(), "ada@example.com", "ada")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
