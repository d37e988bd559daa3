/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with all
/// routes and middleware.
///
/// # Example
///
/// ```no_run
/// use linkstash_api::{app::AppState, config::Config};
/// use linkstash_shared::search::{spawn_mirror, SearchClient};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let search = SearchClient::new(&config.search.url, &config.search.index)?;
/// let mirror_store = SearchClient::new(&config.search.url, &config.search.index)?;
/// let (mirror, _worker) = spawn_mirror(mirror_store, config.search.queue_capacity);
/// let state = AppState::new(pool, search, mirror, config);
/// let app = linkstash_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    routing::{get, post, put},
    Router,
};
use linkstash_shared::search::{MirrorHandle, SearchClient};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. Uses Arc
/// internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Search backend, used directly for browse reads
    pub search: Arc<SearchClient>,

    /// Producer handle of the mirror queue, used for index writes
    pub mirror: MirrorHandle,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, search: SearchClient, mirror: MirrorHandle, config: Config) -> Self {
        Self {
            db,
            search: Arc::new(search),
            mirror,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                    # Health check (public)
/// └── /api/
///     ├── /auth/                 # Authentication
///     │   ├── POST /register
///     │   ├── POST /login
///     │   ├── POST /logout       (authenticated)
///     │   └── PUT  /password     (authenticated)
///     ├── GET  /links            # Browse (authenticated)
///     ├── /link/                 # Link management (authenticated)
///     │   ├── POST   /save
///     │   ├── GET    /:id
///     │   ├── PUT    /:id
///     │   └── DELETE /:id
///     ├── POST /import           # Bookmark import (authenticated)
///     ├── GET  /tags             # Tag listing (authenticated)
///     ├── /tag/                  # Tag management (authenticated)
///     ├── GET  /settings         # All settings (authenticated)
///     └── /setting/:key          # Single setting (authenticated)
/// ```
///
/// Authentication is enforced per-handler through the `AuthUser` extractor
/// rather than a middleware layer, so an unauthenticated handler cannot
/// accidentally receive a user.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/password", put(routes::auth::change_password));

    let link_routes = Router::new()
        .route("/save", post(routes::links::save_link))
        .route(
            "/:id",
            get(routes::links::get_link)
                .put(routes::links::update_link)
                .delete(routes::links::delete_link),
        );

    let tag_routes = Router::new()
        .route("/", post(routes::tags::create_tag))
        .route(
            "/:id",
            get(routes::tags::get_tag)
                .put(routes::tags::update_tag)
                .delete(routes::tags::delete_tag),
        );

    let setting_routes = Router::new().route(
        "/:key",
        get(routes::settings::get_setting)
            .put(routes::settings::put_setting)
            .delete(routes::settings::delete_setting),
    );

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .route("/links", get(routes::links::browse_links))
        .nest("/link", link_routes)
        .route("/import", post(routes::import::import_links))
        .route("/tags", get(routes::tags::list_tags))
        .nest("/tag", tag_routes)
        .route("/settings", get(routes::settings::list_settings))
        .nest("/setting", setting_routes);

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
