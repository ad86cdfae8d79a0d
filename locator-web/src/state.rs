//! Shared application state

use crate::WebConfig;
use chrono::{DateTime, Utc};
use locator_client::SessionManager;
use std::sync::Arc;

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: WebConfig,
    /// The single account session shared by all requests
    pub sessions: Arc<SessionManager>,
    /// When the server process started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: WebConfig, sessions: Arc<SessionManager>) -> Self {
        Self {
            config,
            sessions,
            started_at: Utc::now(),
        }
    }
}
