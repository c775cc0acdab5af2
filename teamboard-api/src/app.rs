/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use teamboard_api::{app::AppState, config::Config};
/// use teamboard_shared::store::memory::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = teamboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware, routes};
use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use teamboard_shared::services::Services;
use teamboard_shared::store::Store;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend, used directly for authorization lookups
    pub store: Arc<dyn Store>,

    /// Lifecycle services wired against `store`
    pub services: Arc<Services>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the services against `store`
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        let services = Services::new(store.clone(), config.jwt.settings());
        Self {
            store,
            services: Arc::new(services),
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                                   # Health check (public)
/// └── /api/
///     ├── /auth/register, /login, /refresh      # Public
///     ├── /auth/me, /auth/me/password           # Authenticated
///     ├── /workspaces[/:id]                     # Workspace CRUD
///     ├── /workspaces/owner/:owner_id, /search
///     ├── /workspaces/:id/members[/:user_id]
///     ├── /workspaces/:id/projects[/:project_id]
///     ├── /workspaces/:id/projects/:project_id/columns, /tasks
///     ├── /projects/:id/columns, /tasks
///     ├── /columns/:id/tasks
///     └── /tasks/:id, /column/:column_id, /assignee
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost first):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. Bearer authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/refresh", post(routes::auth::refresh));

    let protected_routes = Router::new()
        .route("/api/auth/me", get(routes::auth::me).put(routes::auth::update_me))
        .route("/api/auth/me/password", put(routes::auth::change_password))
        .route(
            "/api/workspaces",
            get(routes::workspaces::list_workspaces).post(routes::workspaces::create_workspace),
        )
        .route("/api/workspaces/search", get(routes::workspaces::search_workspaces))
        .route(
            "/api/workspaces/owner/:owner_id",
            get(routes::workspaces::list_workspaces_by_owner),
        )
        .route(
            "/api/workspaces/:id",
            get(routes::workspaces::get_workspace)
                .put(routes::workspaces::update_workspace)
                .delete(routes::workspaces::delete_workspace),
        )
        .route(
            "/api/workspaces/:id/members",
            get(routes::members::list_members).post(routes::members::add_member),
        )
        .route(
            "/api/workspaces/:id/members/:user_id",
            put(routes::members::update_member_role).delete(routes::members::remove_member),
        )
        .route(
            "/api/workspaces/:id/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/api/workspaces/:id/projects/:project_id",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route(
            "/api/workspaces/:id/projects/:project_id/columns",
            get(routes::columns::list_workspace_project_columns),
        )
        .route(
            "/api/workspaces/:id/projects/:project_id/tasks",
            get(routes::tasks::list_workspace_project_tasks)
                .post(routes::tasks::create_workspace_project_task),
        )
        .route("/api/projects/:id/columns", get(routes::columns::list_project_columns))
        .route(
            "/api/projects/:id/tasks",
            get(routes::tasks::list_project_tasks).post(routes::tasks::create_task),
        )
        .route("/api/columns/:id/tasks", get(routes::tasks::list_column_tasks))
        .route(
            "/api/tasks/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/api/tasks/:id/column/:column_id", patch(routes::tasks::move_task))
        .route("/api/tasks/:id/assignee", patch(routes::tasks::assign_task))
        .layer(from_fn_with_state(state.clone(), middleware::auth::require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(from_fn_with_state(
            state.config.api.production,
            middleware::security::security_headers,
        ))
        .with_state(state)
}

/// CORS from the configured origin list; `*` selects permissive CORS
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
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
