//! HTTP boundary: route table, CORS policy and server startup.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `GET` | `{prefix}/healthchecker` | [`handlers::healthchecker`] |
//! | `POST` | `{prefix}/update_metadata` | [`handlers::update_metadata`] |
//!
//! The prefix comes from [`ServerConfig::route_prefix`](crate::config::ServerConfig).

pub mod error;
pub mod handlers;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::config::Config;

pub use error::{ApiError, ErrorBody};
pub use handlers::{HEALTH_MESSAGE, UpdateMetadataRequest, UpdateMetadataResponse};

/// Build the application router from the given configuration.
///
/// CORS mirrors the caller's origin, method and headers and allows credentials, so the
/// service should only be exposed to trusted frontends.
pub fn build_router(config: &Config) -> Router {
    let routes = Router::new()
        .route("/healthchecker", get(handlers::healthchecker))
        .route("/update_metadata", post(handlers::update_metadata));

    let prefix = normalize_prefix(&config.server.route_prefix);
    let app = if prefix.is_empty() {
        Router::new().merge(routes)
    } else {
        Router::new().nest(&prefix, routes)
    };

    app.layer(DefaultBodyLimit::max(config.server.max_body_bytes))
        .layer(CorsLayer::very_permissive())
}

/// `"api/images/"` → `"/api/images"`, `"/"` → `""`.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: &Config) -> Result<()> {
    let app = build_router(config);
    let addr = config.socket_addr();

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    log::info!(
        "Listening on http://{}{}",
        addr,
        normalize_prefix(&config.server.route_prefix)
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested");
}
