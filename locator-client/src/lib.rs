//! Locator Client - remote account service access
//!
//! [`api`] defines the account service traits and the HTTP gateway adapter;
//! [`manager`] wraps them in the retrying, reauthenticating [`SessionManager`].

pub mod api;
pub mod manager;

pub use api::{AccountService, AccountSession, ApiClientConfig, HttpAccountService};
pub use manager::{Fetchable, SessionManager};

use locator_core::{LocatorConfig, LocatorResult};
use std::sync::Arc;

/// Build a session manager talking to the configured gateway
pub fn session_manager_from_config(config: &LocatorConfig) -> LocatorResult<SessionManager> {
    let service = HttpAccountService::new(config.service.clone().into())?;
    Ok(
        SessionManager::new(Arc::new(service), config.account.credentials())
            .with_retry_policy(config.retry.clone())
            .with_fetch_retries(config.fetch_retries),
    )
}
