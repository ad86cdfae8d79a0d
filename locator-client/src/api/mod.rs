//! Remote account service interface
//!
//! The account service is consumed through two narrow traits: an
//! [`AccountService`] that performs the login handshake and hands out an
//! [`AccountSession`], and the session itself which can reauthenticate in
//! place and read the device and the location list.

use async_trait::async_trait;
use locator_core::{
    Credentials, DeviceDescriptor, ErrorContext, LocationRecord, LocatorError, LocatorResult,
    RemoteError, ServiceConfig,
};
use std::collections::HashMap;
use url::Url;

pub mod http;

pub use http::{HttpAccountService, HttpSession};

/// Entry point to the remote account service
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Log in with `credentials` and return an authenticated session
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Box<dyn AccountSession>, RemoteError>;
}

/// Authenticated handle to the remote account service
#[async_trait]
pub trait AccountSession: Send + Sync {
    /// Re-run the login handshake, refreshing this session's credentials
    /// and state in place
    async fn authenticate(&self) -> Result<(), RemoteError>;

    /// Read the primary device, `None` when the account has none
    async fn device(&self) -> Result<Option<DeviceDescriptor>, RemoteError>;

    /// Read the shared-location list
    async fn locations(&self) -> Result<Vec<LocationRecord>, RemoteError>;
}

/// Configuration for the HTTP gateway client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL of the gateway
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
    /// Additional headers
    pub headers: HashMap<String, String>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        ServiceConfig::default().into()
    }
}

impl From<ServiceConfig> for ApiClientConfig {
    fn from(service: ServiceConfig) -> Self {
        Self {
            base_url: service.base_url,
            timeout_seconds: service.timeout_seconds,
            user_agent: service.user_agent,
            headers: HashMap::new(),
        }
    }
}

impl ApiClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set additional header
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Parse the base URL, normalized to end with a slash so that endpoint
    /// paths join underneath it
    pub(crate) fn base(&self) -> LocatorResult<Url> {
        let mut base = self.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        Url::parse(&base).map_err(|e| LocatorError::Config {
            message: format!("Invalid service URL '{}': {}", self.base_url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client")
                .with_operation("parse_base_url")
                .with_suggestion("Set LOCATOR_SERVICE_URL to an absolute http(s) URL"),
        })
    }
}

/// Helper function to create HTTP client with common configuration
pub(crate) fn create_http_client(config: &ApiClientConfig) -> LocatorResult<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();

    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_str(&config.user_agent).map_err(|e| {
            LocatorError::Config {
                message: format!("Invalid user agent: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("create_client"),
            }
        })?,
    );

    for (key, value) in &config.headers {
        let header_name = reqwest::header::HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            LocatorError::Config {
                message: format!("Invalid header name '{}': {}", key, e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("create_client"),
            }
        })?;

        let header_value =
            reqwest::header::HeaderValue::from_str(value).map_err(|e| LocatorError::Config {
                message: format!("Invalid header value for '{}': {}", key, e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("create_client"),
            })?;

        headers.insert(header_name, header_value);
    }

    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .default_headers(headers)
        .build()
        .map_err(|e| LocatorError::Config {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("create_client"),
        })
}

/// Classify a non-success gateway response
pub(crate) async fn handle_response_error(response: reqwest::Response) -> RemoteError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = if body.is_empty() {
        status.canonical_reason().unwrap_or("Unknown error").to_string()
    } else {
        body
    };

    match status.as_u16() {
        401 => RemoteError::LoginFailed(message),
        403 => RemoteError::ServiceNotActivated(message),
        428 => RemoteError::TwoFactorRequired,
        code => RemoteError::Api {
            message,
            status: Some(code),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_client_config_from_service() {
        let config: ApiClientConfig = ServiceConfig {
            base_url: "https://gateway.example.com/v1".to_string(),
            timeout_seconds: 5,
            user_agent: "locator-test".to_string(),
        }
        .into();

        assert_eq!(config.timeout_seconds, 5);
        assert_eq!(
            config.base().unwrap().join("session").unwrap().as_str(),
            "https://gateway.example.com/v1/session"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ApiClientConfig::new("not a url");
        assert!(matches!(config.base(), Err(LocatorError::Config { .. })));
    }

    #[test]
    fn test_invalid_header_rejected() {
        let config =
            ApiClientConfig::default().with_header("bad header".to_string(), "x".to_string());
        assert!(create_http_client(&config).is_err());
    }
}
