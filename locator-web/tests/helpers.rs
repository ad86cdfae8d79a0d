//! Shared fixtures for the HTTP surface tests

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use locator_client::{AccountService, AccountSession, SessionManager};
use locator_core::{Credentials, DeviceDescriptor, LocationRecord, RemoteError, RetryPolicy};
use locator_web::{create_app, AppState, WebConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Account with a fixed device and location list
pub struct StaticAccount {
    pub login: Result<(), RemoteError>,
    pub device: Option<DeviceDescriptor>,
    pub locations: Vec<LocationRecord>,
    /// Every read and reauthentication fails with a transient error
    pub unavailable: bool,
}

impl StaticAccount {
    pub fn with_locations(locations: Value) -> Self {
        Self {
            login: Ok(()),
            device: None,
            locations: serde_json::from_value(locations).unwrap(),
            unavailable: false,
        }
    }
}

struct StaticSession {
    device: Option<DeviceDescriptor>,
    locations: Vec<LocationRecord>,
    unavailable: bool,
}

impl StaticSession {
    fn check(&self) -> Result<(), RemoteError> {
        if self.unavailable {
            return Err(RemoteError::api("service unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountService for StaticAccount {
    async fn authenticate(
        &self,
        _credentials: &Credentials,
    ) -> Result<Box<dyn AccountSession>, RemoteError> {
        self.login.clone()?;
        Ok(Box::new(StaticSession {
            device: self.device.clone(),
            locations: self.locations.clone(),
            unavailable: self.unavailable,
        }))
    }
}

#[async_trait]
impl AccountSession for StaticSession {
    async fn authenticate(&self) -> Result<(), RemoteError> {
        self.check()
    }

    async fn device(&self) -> Result<Option<DeviceDescriptor>, RemoteError> {
        self.check()?;
        Ok(self.device.clone())
    }

    async fn locations(&self) -> Result<Vec<LocationRecord>, RemoteError> {
        self.check()?;
        Ok(self.locations.clone())
    }
}

pub struct TestApp {
    pub router: Router,
    pub sessions: Arc<SessionManager>,
}

pub fn spawn_app(account: StaticAccount) -> TestApp {
    spawn_app_with_policy(account, RetryPolicy::no_retry())
}

pub fn spawn_app_with_policy(account: StaticAccount, policy: RetryPolicy) -> TestApp {
    let sessions = Arc::new(
        SessionManager::new(Arc::new(account), Credentials::new("me@example.com", "pw"))
            .with_retry_policy(policy),
    );
    let config = WebConfig {
        version: "v42".to_string(),
        ..Default::default()
    };
    TestApp {
        router: create_app(AppState::new(config, sessions.clone())),
        sessions,
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, body) = self.get(uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    pub async fn get_text(&self, uri: &str) -> (StatusCode, String) {
        let (status, body) = self.get(uri).await;
        (status, String::from_utf8(body).unwrap())
    }
}

/// Two shared locations: one with an address and timestamp, one without data
pub fn two_locations() -> Value {
    json!([
        {
            "id": "friend-1",
            "location": {
                "address": {"formattedAddressLines": ["1 Infinite Loop", "Cupertino, CA"]},
                "timestamp": 1_700_000_000_000i64
            }
        },
        {"id": "friend-2"}
    ])
}
