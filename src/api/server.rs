// API server.
// Builds the router, binds the listener, and shuts down on ctrl-c.

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::projects::ProjectFeed;

use super::routes::{AppState, cache_info, cleanup_cache, clear_cache, github_repos, health_check};

/// Build the router over a shared feed.
pub fn router(feed: ProjectFeed) -> Router {
    let state = Arc::new(AppState { feed });

    Router::new()
        .route("/health", get(health_check))
        .route("/api/github/repos", get(github_repos))
        .route(
            "/api/cache",
            get(cache_info).delete(clear_cache).post(cleanup_cache),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Bind to the configured address and serve until Ctrl-C.
pub async fn start(config: &Config) -> Result<()> {
    let feed = ProjectFeed::from_config(config)?;

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(
        %addr,
        username = %config.username,
        cache_dir = %feed.cache().directory().display(),
        "starting API server"
    );

    serve(listener, feed).await
}

/// Serve on an already bound listener.
pub async fn serve(listener: TcpListener, feed: ProjectFeed) -> Result<()> {
    axum::serve(listener, router(feed))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutting down"),
        // Without a signal handler, run until the task is dropped.
        Err(_) => std::future::pending::<()>().await,
    }
}
