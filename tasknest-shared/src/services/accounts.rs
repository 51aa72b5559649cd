//! Registration, login and current-user lookup
//!
//! Login answers the same 401 for an unknown email and a wrong password.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::conflict_on_unique;
use crate::auth::jwt::JwtSettings;
use crate::auth::password;
use crate::error::{ServiceError, ServiceResult, StoreError};
use crate::models::user::{CreateUser, User};
use crate::projection::UserResponse;
use crate::store::Store;

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const EMAIL_TAKEN: &str = "Email already exists";
const USERNAME_TAKEN: &str = "Username already exists";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

/// Token grant returned by register and login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
    pub expires_in: String,
}

fn grant(jwt: &JwtSettings, user: User) -> ServiceResult<AuthResponse> {
    let token = jwt.issue(user.id, &user.email, &user.username)?;
    Ok(AuthResponse {
        user: user.into(),
        token,
        expires_in: jwt.expires_in(),
    })
}

pub async fn register(
    store: &dyn Store,
    jwt: &JwtSettings,
    data: Registration,
) -> ServiceResult<AuthResponse> {
    if data.password != data.password_confirm {
        return Err(ServiceError::InvalidInput("Passwords do not match".to_string()));
    }
    password::validate_password_strength(&data.password)
        .map_err(|e| ServiceError::InvalidInput(e.to_string()))?;

    if store.find_user_by_email(&data.email).await?.is_some() {
        tracing::warn!(email = %data.email, "Registration with existing email");
        return Err(ServiceError::Conflict(EMAIL_TAKEN.to_string()));
    }
    if store.find_user_by_username(&data.username).await?.is_some() {
        tracing::warn!(username = %data.username, "Registration with existing username");
        return Err(ServiceError::Conflict(USERNAME_TAKEN.to_string()));
    }

    let password_hash = password::hash_password(&data.password)?;

    let user = store
        .create_user(CreateUser {
            email: data.email,
            username: data.username,
            password_hash,
        })
        .await
        .map_err(|e| {
            let message = match &e {
                StoreError::UniqueViolation(c) if c.contains("username") => USERNAME_TAKEN,
                _ => EMAIL_TAKEN,
            };
            conflict_on_unique(e, message)
        })?;

    tracing::info!(user_id = %user.id, "User registered");
    grant(jwt, user)
}

pub async fn login(
    store: &dyn Store,
    jwt: &JwtSettings,
    email: &str,
    password: &str,
) -> ServiceResult<AuthResponse> {
    let Some(user) = store.find_user_by_email(email).await? else {
        tracing::warn!(email = %email, "Login for unknown email");
        return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    if !password::verify_password(password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "Login with wrong password");
        return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    tracing::info!(user_id = %user.id, "User logged in");
    grant(jwt, user)
}

/// The authenticated user's own profile
pub async fn me(store: &dyn Store, actor_id: Uuid) -> ServiceResult<UserResponse> {
    store
        .find_user(actor_id)
        .await?
        .map(UserResponse::from)
        .ok_or_else(|| ServiceError::user_not_found(actor_id))
}
