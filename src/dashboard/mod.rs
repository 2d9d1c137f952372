//! Dashboard — Axum JSON API around one play session.
//!
//! CORS enabled for local development.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, Method},
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub use routes::{ApiState, AppState};

/// Bind `host:port` and serve until the process stops.
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid listen address {host}:{port}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "API server listening on http://{addr}");

    axum::serve(listener, build_router(state))
        .await
        .context("API server error")
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            "/api/history",
            get(routes::get_history)
                .put(routes::put_history)
                .delete(routes::delete_history),
        )
        .route("/api/draws", post(routes::post_draw))
        .route("/api/random", post(routes::post_random))
        .route("/api/analysis", get(routes::get_analysis))
        .route("/api/progression", get(routes::get_progression))
        .route("/api/max-stake", put(routes::put_max_stake))
        .route("/api/reset", post(routes::post_reset))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
