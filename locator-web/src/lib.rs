//! Locator Web Server
//!
//! Thin HTTP surface over the session manager: last-known location lookups,
//! the device descriptor, and a few liveness endpoints.

pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

// Re-export main types
pub use server::{LocatorServer, LocatorServerBuilder};
pub use state::AppState;

use axum::{
    http::{header::CONTENT_TYPE, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    Router,
};
use locator_core::LocatorError;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .merge(routes::location_routes())
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Deployment version reported by `/now`
    pub version: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            version: "v0".to_string(),
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("LOCATOR_HOST").unwrap_or(defaults.host),
            port: std::env::var("LOCATOR_PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(defaults.port),
            version: std::env::var("APP_VERSION").unwrap_or(defaults.version),
        }
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Account service unavailable: {0}")]
    Session(#[from] LocatorError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            WebError::Session(err) => (
                StatusCode::BAD_GATEWAY,
                err.remote().map(|e| e.code()).unwrap_or("session_error"),
            ),
            WebError::Server(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error"),
            WebError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
        };

        tracing::error!(error = %self, code, "Request failed");

        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "code": code,
        }));
        (status, body).into_response()
    }
}
