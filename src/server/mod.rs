mod handlers;
mod state;

use axum::Router;
use axum::routing::get;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::atlas::Atlas;
use crate::error::{Error, Result};

pub fn build_router(atlas: Atlas) -> Router {
    let state = Arc::new(AppState { atlas });

    Router::new()
        .route("/api/region", get(handlers::region))
        .route("/api/danger", get(handlers::danger))
        .route("/api/detail", get(handlers::detail))
        .route("/api/provinces", get(handlers::provinces))
        .route("/api/province", get(handlers::province))
        .route("/api/city", get(handlers::city))
        .route("/api/world", get(handlers::world))
        .route("/api/country", get(handlers::country))
        .route("/api/news", get(handlers::news))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(atlas: Atlas, host: &str, port: u16) -> Result<()> {
    let app = build_router(atlas);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Configuration(format!("cannot bind to {}: {}", addr, e)))?;

    info!("epiatlas server listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app).await.map_err(|e| {
        error!("server error: {}", e);
        Error::Io(e)
    })
}
