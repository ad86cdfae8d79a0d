//! Configuration management
//!
//! Settings come from an optional TOML file and the process environment; the
//! account credentials in the environment always win over the file.

use crate::error::{ErrorContext, LocatorError, LocatorResult};
use crate::logging::LoggingConfig;
use crate::retry::RetryPolicy;
use crate::types::Credentials;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const EMAIL_ENV: &str = "APP_EMAIL";
pub const PASSWORD_ENV: &str = "APPLE_PW";
pub const SERVICE_URL_ENV: &str = "LOCATOR_SERVICE_URL";
pub const SERVICE_TIMEOUT_ENV: &str = "LOCATOR_SERVICE_TIMEOUT";
pub const FETCH_RETRIES_ENV: &str = "LOCATOR_FETCH_RETRIES";

/// Number of read attempts a fetch makes before reporting absence
pub const DEFAULT_FETCH_RETRIES: usize = 3;

/// Remote account credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub email: String,
    pub password: String,
}

impl AccountConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.email.clone(), self.password.clone())
    }
}

/// Remote gateway connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9000".to_string(),
            timeout_seconds: 30,
            user_agent: "locator/0.1".to_string(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    pub account: AccountConfig,
    pub service: ServiceConfig,
    /// Backoff policy for authentication and reauthentication
    pub retry: RetryPolicy,
    pub fetch_retries: usize,
    pub logging: LoggingConfig,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            account: AccountConfig::default(),
            service: ServiceConfig::default(),
            retry: RetryPolicy::default(),
            fetch_retries: DEFAULT_FETCH_RETRIES,
            logging: LoggingConfig::default(),
        }
    }
}

impl LocatorConfig {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> LocatorResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LocatorError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: LocatorConfig = toml::from_str(&content).map_err(|e| LocatorError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Load the optional file, then overlay the environment and validate
    pub fn load(path: Option<&Path>) -> LocatorResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from an environment lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> LocatorResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(email) = lookup(EMAIL_ENV) {
            self.account.email = email;
        }
        if let Some(password) = lookup(PASSWORD_ENV) {
            self.account.password = password;
        }
        if let Some(url) = lookup(SERVICE_URL_ENV) {
            self.service.base_url = url;
        }
        if let Some(timeout) = lookup(SERVICE_TIMEOUT_ENV) {
            self.service.timeout_seconds = parse_env(SERVICE_TIMEOUT_ENV, &timeout)?;
        }
        if let Some(retries) = lookup(FETCH_RETRIES_ENV) {
            self.fetch_retries = parse_env(FETCH_RETRIES_ENV, &retries)?;
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> LocatorResult<()> {
        if self.account.email.is_empty() {
            return Err(LocatorError::Config {
                message: format!("{} is not set", EMAIL_ENV),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Export the account email or set account.email"),
            });
        }

        if self.account.password.is_empty() {
            return Err(LocatorError::Config {
                message: format!("{} is not set", PASSWORD_ENV),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Export the account password or set account.password"),
            });
        }

        if self.retry.max_attempts == 0 {
            return Err(crate::validation_error!(
                "retry.max_attempts must be greater than 0",
                "retry.max_attempts",
                "config"
            ));
        }

        if self.fetch_retries == 0 {
            return Err(crate::validation_error!(
                "fetch_retries must be greater than 0",
                "fetch_retries",
                "config"
            ));
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> LocatorResult<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse().map_err(|e| LocatorError::Config {
        message: format!("Invalid value for {}: {:?}", key, value),
        source: Some(Box::new(e)),
        context: ErrorContext::new("config")
            .with_operation("parse_env")
            .with_metadata("variable", key),
    })
}
