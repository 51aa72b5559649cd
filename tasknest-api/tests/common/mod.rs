/// Shared setup for API integration tests
///
/// Every test gets a fresh router over its own `MemoryStore`; users are
/// inserted straight into the store and given real signed tokens.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tasknest_api::app::{build_router, AppState};
use tasknest_api::config::Config;
use tasknest_shared::auth::jwt::JwtSettings;
use tasknest_shared::models::user::{CreateUser, User};
use tasknest_shared::store::{MemoryStore, Store};
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret-at-least-32-chars";

pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub jwt: JwtSettings,
}

/// A stored user plus a bearer token for it
pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestContext {
    pub fn new() -> Self {
        let vars: HashMap<&str, &str> = [("STORAGE_BACKEND", "memory"), ("JWT_SECRET", SECRET)]
            .into_iter()
            .collect();
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
            .expect("test config should load");

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), config);
        let jwt = state.jwt.clone();

        Self {
            app: build_router(state),
            store,
            jwt,
        }
    }

    pub async fn user(&self, username: &str) -> TestUser {
        let user = self
            .store
            .create_user(CreateUser {
                email: format!("{}@example.com", username),
                username: username.to_string(),
                password_hash: "unused".to_string(),
            })
            .await
            .expect("user should be created");

        let token = self
            .jwt
            .issue(user.id, &user.email, &user.username)
            .expect("token should be issued");

        TestUser { user, token }
    }

    /// Sends a request and returns the status plus the parsed JSON body
    /// (`Value::Null` for an empty body)
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }
}
