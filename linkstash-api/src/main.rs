//! # Linkstash API Server
//!
//! HTTP server for the Linkstash bookmark manager. Serves authentication,
//! link and tag management, settings, search-backed browsing, and imports,
//! backed by PostgreSQL with an Elasticsearch search mirror kept in sync by
//! a background worker.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p linkstash-api
//! ```

use linkstash_api::{app, config::Config};
use linkstash_shared::db::{close_pool, create_pool, DatabaseConfig};
use linkstash_shared::search::{spawn_mirror, SearchClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linkstash_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Linkstash API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    linkstash_shared::db::migrations::run_migrations(&pool).await?;

    // One client answers searches from handlers, one feeds the mirror worker
    let search = SearchClient::new(&config.search.url, &config.search.index)?;
    let mirror_store = SearchClient::new(&config.search.url, &config.search.index)?;
    let (mirror, mirror_worker) = spawn_mirror(mirror_store, config.search.queue_capacity);

    let bind_address = config.bind_address();
    let state = app::AppState::new(pool.clone(), search, mirror, config);
    let router = app::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router (and with it the last mirror handle) is gone; wait for the
    // worker to drain the queue so no accepted write is lost.
    tracing::info!("Shutdown signal received, draining mirror queue...");
    mirror_worker.await?;

    close_pool(pool).await;

    tracing::info!("Goodbye");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
    }
}
