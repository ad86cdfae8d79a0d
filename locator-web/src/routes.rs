//! Route definitions for the Locator web server

use crate::{handlers, openapi, AppState};
use axum::{routing::get, Router};

/// Location proxy routes, served from the root
pub fn location_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::hello))
        .route("/now", get(handlers::now))
        .route("/loc", get(handlers::locate))
        .route("/loc/{idx}", get(handlers::locate_index))
        .route("/device", get(handlers::device))
}

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(openapi::openapi_spec))
}
