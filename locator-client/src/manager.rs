//! Session Manager - resilient access to the remote account session
//!
//! Owns at most one authenticated [`AccountSession`], created lazily on first
//! use. Authentication and reauthentication run under the configured
//! [`RetryPolicy`] and give up at once on fatal errors. Reads retry a fixed
//! number of times, reauthenticating after every remote failure, and report
//! absence instead of an error once they run out.
//!
//! Every operation holds the session lock for its whole duration, so no caller
//! can observe a session that is being created or reauthenticated.

use crate::api::{AccountService, AccountSession};
use async_trait::async_trait;
use chrono::Utc;
use locator_core::{
    lookup_address, remote_error, retry_with_policy, AddressLookup, Credentials,
    DeviceDescriptor, LocationRecord, LocatorResult, RemoteError, RetryPolicy,
    DEFAULT_FETCH_RETRIES,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

type SessionSlot = Option<Box<dyn AccountSession>>;

/// A resource that can be read through an [`AccountSession`]
#[async_trait]
pub trait Fetchable: Sized + Send {
    /// Name used in log messages, e.g. `fetch_device`
    const OPERATION: &'static str;

    /// Read the resource; `Ok(None)` means the session returned nothing usable
    async fn read(session: &dyn AccountSession) -> Result<Option<Self>, RemoteError>;
}

#[async_trait]
impl Fetchable for DeviceDescriptor {
    const OPERATION: &'static str = "fetch_device";

    async fn read(session: &dyn AccountSession) -> Result<Option<Self>, RemoteError> {
        session.device().await
    }
}

#[async_trait]
impl Fetchable for Vec<LocationRecord> {
    const OPERATION: &'static str = "fetch_locations";

    async fn read(session: &dyn AccountSession) -> Result<Option<Self>, RemoteError> {
        let locations = session.locations().await?;
        Ok((!locations.is_empty()).then_some(locations))
    }
}

/// Lazily-authenticated, self-healing account session
pub struct SessionManager {
    service: Arc<dyn AccountService>,
    credentials: Credentials,
    policy: RetryPolicy,
    fetch_retries: usize,
    session: Mutex<SessionSlot>,
    ready: AtomicBool,
}

impl SessionManager {
    /// Create a session manager; no remote call is made until first use
    pub fn new(service: Arc<dyn AccountService>, credentials: Credentials) -> Self {
        Self {
            service,
            credentials,
            policy: RetryPolicy::default(),
            fetch_retries: DEFAULT_FETCH_RETRIES,
            session: Mutex::new(None),
            ready: AtomicBool::new(false),
        }
    }

    /// Backoff policy for authentication and reauthentication
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Read attempts used by [`fetch_device`](Self::fetch_device) and
    /// [`fetch_locations`](Self::fetch_locations)
    pub fn with_fetch_retries(mut self, retries: usize) -> Self {
        self.fetch_retries = retries;
        self
    }

    /// Whether an authenticated session currently exists.
    ///
    /// Does not wait for the session lock, so it answers even while a fetch
    /// is backing off.
    pub fn is_initialized(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Create the session if it does not exist yet
    pub async fn init(&self) -> LocatorResult<()> {
        let mut slot = self.session.lock().await;
        self.ensure_session(&mut slot).await?;
        Ok(())
    }

    /// Re-run the login handshake on the existing session. Creates the
    /// session instead when there is none.
    pub async fn reauth(&self) -> LocatorResult<()> {
        let mut slot = self.session.lock().await;
        if let Some(session) = slot.as_deref() {
            return self.reauth_session(session).await;
        }
        self.ensure_session(&mut slot).await.map(|_| ())
    }

    /// Drop the current session; the next operation logs in again
    pub async fn reset(&self) {
        let mut slot = self.session.lock().await;
        self.ready.store(false, Ordering::Release);
        if slot.take().is_some() {
            info!("Discarded account session");
        }
    }

    pub async fn fetch_device(&self) -> LocatorResult<Option<DeviceDescriptor>> {
        self.fetch(self.fetch_retries).await
    }

    pub async fn fetch_locations(&self) -> LocatorResult<Option<Vec<LocationRecord>>> {
        self.fetch(self.fetch_retries).await
    }

    /// Fetch the locations and look up the 1-based `idx`; below 1 returns all
    pub async fn fetch_address(&self, idx: i64) -> LocatorResult<AddressLookup> {
        let locations = self.fetch_locations().await?;
        Ok(lookup_address(locations.as_deref(), idx, Utc::now()))
    }

    /// Read `T` up to `retries` times.
    ///
    /// Only a failure to create the session is returned as an error; remote
    /// errors during reads are logged and answered with a reauthentication.
    pub async fn fetch<T: Fetchable>(&self, retries: usize) -> LocatorResult<Option<T>> {
        let mut slot = self.session.lock().await;
        let session = self.ensure_session(&mut slot).await?;

        for attempt in 0..retries {
            info!("({}) Calling {}", attempt, T::OPERATION);

            match T::read(session).await {
                Ok(Some(value)) => return Ok(Some(value)),
                Ok(None) => {}
                Err(e) => {
                    error!(error = %e, "Failed to fetch");
                    if let Err(e) = self.reauth_session(session).await {
                        error!(error = %e, "Failed to reauth");
                    }
                }
            }

            error!("({}) Failed to {}", attempt, T::OPERATION);
        }

        error!("No more retries for {}", T::OPERATION);
        Ok(None)
    }

    async fn ensure_session<'a>(
        &self,
        slot: &'a mut SessionSlot,
    ) -> LocatorResult<&'a dyn AccountSession> {
        info!(initialized = slot.is_some(), "init called for account session");

        let session = match slot.take() {
            Some(session) => session,
            None => self.create_session().await?,
        };
        self.ready.store(true, Ordering::Release);
        Ok(&**slot.insert(session))
    }

    async fn create_session(&self) -> LocatorResult<Box<dyn AccountSession>> {
        info!(email = %self.credentials.email, "Creating account session");

        let service = self.service.as_ref();
        let credentials = &self.credentials;
        retry_with_policy(&self.policy, "create_session", RemoteError::is_fatal, move || {
            service.authenticate(credentials)
        })
        .await
        .map_err(|e| remote_error!(e, "session_manager", "create_session"))
    }

    async fn reauth_session(&self, session: &dyn AccountSession) -> LocatorResult<()> {
        info!("reauth called for account session");

        retry_with_policy(&self.policy, "reauth", RemoteError::is_fatal, move || {
            session.authenticate()
        })
        .await
        .map_err(|e| remote_error!(e, "session_manager", "reauth"))
    }
}
