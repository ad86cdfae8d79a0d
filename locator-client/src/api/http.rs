//! JSON gateway client
//!
//! Talks to an HTTP gateway in front of the account service:
//! `POST /session` logs in and returns a bearer token, `GET /device` and
//! `GET /locations` read the account data with that token.

use async_trait::async_trait;
use locator_core::{Credentials, DeviceDescriptor, LocationRecord, LocatorResult, RemoteError};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

use super::{
    create_http_client, handle_response_error, AccountService, AccountSession, ApiClientConfig,
};

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

/// Account service reached through the HTTP gateway
pub struct HttpAccountService {
    client: reqwest::Client,
    base: Url,
}

impl HttpAccountService {
    /// Create a new gateway client
    pub fn new(config: ApiClientConfig) -> LocatorResult<Self> {
        let client = create_http_client(&config)?;
        let base = config.base()?;

        info!("Created account gateway client for {}", base);

        Ok(Self { client, base })
    }
}

#[async_trait]
impl AccountService for HttpAccountService {
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Box<dyn AccountSession>, RemoteError> {
        let token = login(&self.client, &self.base, credentials).await?;
        Ok(Box::new(HttpSession {
            client: self.client.clone(),
            base: self.base.clone(),
            credentials: credentials.clone(),
            token: RwLock::new(token),
        }))
    }
}

/// Session holding a gateway bearer token
pub struct HttpSession {
    client: reqwest::Client,
    base: Url,
    credentials: Credentials,
    token: RwLock<String>,
}

impl HttpSession {
    async fn get(&self, endpoint: &str) -> Result<reqwest::Response, RemoteError> {
        let url = endpoint_url(&self.base, endpoint)?;
        debug!("Making gateway request to: {}", url);

        let token = self.token.read().await.clone();
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| RemoteError::api(format!("Request to {} failed: {}", endpoint, e)))?;

        if !response.status().is_success() {
            return Err(handle_response_error(response).await);
        }

        Ok(response)
    }
}

#[async_trait]
impl AccountSession for HttpSession {
    async fn authenticate(&self) -> Result<(), RemoteError> {
        let token = login(&self.client, &self.base, &self.credentials).await?;
        *self.token.write().await = token;
        Ok(())
    }

    async fn device(&self) -> Result<Option<DeviceDescriptor>, RemoteError> {
        let response = self.get("device").await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        response
            .json::<Option<DeviceDescriptor>>()
            .await
            .map_err(|e| RemoteError::api(format!("Failed to parse device: {}", e)))
    }

    async fn locations(&self) -> Result<Vec<LocationRecord>, RemoteError> {
        self.get("locations")
            .await?
            .json::<Vec<LocationRecord>>()
            .await
            .map_err(|e| RemoteError::api(format!("Failed to parse locations: {}", e)))
    }
}

fn endpoint_url(base: &Url, endpoint: &str) -> Result<Url, RemoteError> {
    base.join(endpoint)
        .map_err(|e| RemoteError::api(format!("Invalid endpoint {}: {}", endpoint, e)))
}

async fn login(
    client: &reqwest::Client,
    base: &Url,
    credentials: &Credentials,
) -> Result<String, RemoteError> {
    let url = endpoint_url(base, "session")?;
    debug!(email = %credentials.email, "Logging in to account gateway");

    let response = client
        .post(url)
        .json(&LoginRequest {
            email: &credentials.email,
            password: &credentials.password,
        })
        .send()
        .await
        .map_err(|e| RemoteError::api(format!("Login request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(handle_response_error(response).await);
    }

    let login: LoginResponse = response
        .json()
        .await
        .map_err(|e| RemoteError::api(format!("Failed to parse login response: {}", e)))?;

    Ok(login.token)
}
