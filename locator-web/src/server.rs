//! Locator Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use locator_client::SessionManager;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Main Locator web server
pub struct LocatorServer {
    config: WebConfig,
    state: AppState,
}

impl LocatorServer {
    /// Create a new server around an existing session manager
    pub fn new(config: WebConfig, sessions: Arc<SessionManager>) -> Self {
        let state = AppState::new(config.clone(), sessions);
        Self { config, state }
    }

    /// Start the web server and run until ctrl-c
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("Starting Locator Web Server");
        info!("Server address: http://{}", address);
        info!("Version: {}", self.config.version);

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("Server listening on http://{}", address);

        if let Err(e) = serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        info!("Server shut down gracefully");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Builder for LocatorServer
pub struct LocatorServerBuilder {
    config: WebConfig,
    sessions: Option<Arc<SessionManager>>,
}

impl LocatorServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            config: WebConfig::default(),
            sessions: None,
        }
    }

    /// Start from an existing configuration
    pub fn config(mut self, config: WebConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the version reported by `/now`
    pub fn version<S: Into<String>>(mut self, version: S) -> Self {
        self.config.version = version.into();
        self
    }

    /// Set the session manager shared by all requests
    pub fn sessions(mut self, sessions: Arc<SessionManager>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    /// Build the server
    pub fn build(self) -> WebResult<LocatorServer> {
        let sessions = self
            .sessions
            .ok_or_else(|| WebError::Config("a session manager is required".to_string()))?;
        Ok(LocatorServer::new(self.config, sessions))
    }
}

impl Default for LocatorServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_builder() {
        let builder = LocatorServerBuilder::new()
            .host("localhost")
            .port(3000)
            .version("v7");

        assert_eq!(builder.config.host, "localhost");
        assert_eq!(builder.config.port, 3000);
        assert_eq!(builder.config.version, "v7");
    }

    #[test]
    fn test_build_requires_sessions() {
        assert!(matches!(
            LocatorServerBuilder::new().build(),
            Err(WebError::Config(_))
        ));
    }
}
