/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasknest_api::{app::{build_router, AppState}, config::Config};
/// use tasknest_shared::store::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self as axum_middleware, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tasknest_shared::auth::{jwt::JwtSettings, middleware::authenticate};
use tasknest_shared::store::Store;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer, routes};

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
    pub jwt: JwtSettings,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        let jwt = config.jwt_settings();
        Self {
            store,
            config: Arc::new(config),
            jwt,
        }
    }
}

/// Builds the complete router
///
/// ```text
/// /health                              public
/// /v1/auth/register, /v1/auth/login    public
/// /v1/auth/me                          bearer
/// /v1/users/:id                        bearer
/// /v1/categories[/:id]                 bearer
/// /v1/tasks[/stats/summary|/:id[/toggle-complete]]   bearer
/// /v1/subtasks[/:id[/toggle-complete]]               bearer
/// ```
///
/// Layers, outermost first: security headers, CORS, request tracing.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login));

    let protected = Router::new()
        .route("/auth/me", get(routes::auth::me))
        .route(
            "/users/:id",
            get(routes::users::get_user)
                .patch(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .route(
            "/categories",
            post(routes::categories::create_category).get(routes::categories::list_categories),
        )
        .route(
            "/categories/:id",
            get(routes::categories::get_category)
                .patch(routes::categories::update_category)
                .delete(routes::categories::delete_category),
        )
        .route(
            "/tasks",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route("/tasks/stats/summary", get(routes::tasks::task_stats))
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/tasks/:id/toggle-complete", post(routes::tasks::toggle_task))
        .route("/subtasks", post(routes::subtasks::create_subtask))
        .route(
            "/subtasks/:id",
            axum::routing::patch(routes::subtasks::update_subtask)
                .delete(routes::subtasks::delete_subtask),
        )
        .route(
            "/subtasks/:id/toggle-complete",
            post(routes::subtasks::toggle_subtask),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = public.merge(protected);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Validates the bearer token and stores the caller's
/// [`AuthUser`](tasknest_shared::auth::middleware::AuthUser) in request
/// extensions
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(req.headers(), &state.jwt.secret).map_err(|e| {
        tracing::debug!(error = %e, path = %req.uri().path(), "Rejected unauthenticated request");
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
