//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and the
//! classification of remote account-service failures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type LocatorResult<T> = Result<T, LocatorError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Classified failure reported by the remote account service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Login failed: {0}")]
    LoginFailed(String),

    #[error("Two-factor authentication required")]
    TwoFactorRequired,

    #[error("Service not activated: {0}")]
    ServiceNotActivated(String),

    #[error("API response error{}: {message}", status_suffix(.status))]
    Api {
        message: String,
        status: Option<u16>,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

impl RemoteError {
    /// Create a transient API error without an HTTP status
    pub fn api(message: impl Into<String>) -> Self {
        RemoteError::Api {
            message: message.into(),
            status: None,
        }
    }

    /// Fatal errors need the credentials or account state to change
    /// externally; retrying cannot succeed.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RemoteError::LoginFailed(_)
                | RemoteError::TwoFactorRequired
                | RemoteError::ServiceNotActivated(_)
        )
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            RemoteError::LoginFailed(_) => "login_failed",
            RemoteError::TwoFactorRequired => "two_factor_required",
            RemoteError::ServiceNotActivated(_) => "service_not_activated",
            RemoteError::Api { .. } => "api_error",
        }
    }
}

/// Main error type for the Locator system
#[derive(Error, Debug)]
pub enum LocatorError {
    #[error("Remote service error: {source}")]
    Remote {
        #[source]
        source: RemoteError,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },
}

impl LocatorError {
    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            LocatorError::Remote { context, .. }
            | LocatorError::Config { context, .. }
            | LocatorError::Validation { context, .. } => context,
        }
    }

    /// The classified remote failure, if this error came from the account service
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            LocatorError::Remote { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            LocatorError::Remote { source, .. } => !source.is_fatal(),
            LocatorError::Config { .. } | LocatorError::Validation { .. } => false,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            LocatorError::Remote { source, .. } if !source.is_fatal() => {
                warn!(
                    error_id = %self.context().error_id,
                    error = %self,
                    "Remote service error (may be recoverable)"
                );
            }
            LocatorError::Config { .. } | LocatorError::Validation { .. } => {
                error!(
                    error_id = %self.context().error_id,
                    error = %self,
                    "Configuration or validation error"
                );
            }
            _ => {
                error!(
                    error_id = %self.context().error_id,
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! remote_error {
    ($source:expr, $component:expr) => {
        $crate::LocatorError::Remote {
            source: $source,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($source:expr, $component:expr, $operation:expr) => {
        $crate::LocatorError::Remote {
            source: $source,
            context: $crate::ErrorContext::new($component).with_operation($operation),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::LocatorError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(RemoteError::LoginFailed("bad password".into()).is_fatal());
        assert!(RemoteError::TwoFactorRequired.is_fatal());
        assert!(RemoteError::ServiceNotActivated("findme".into()).is_fatal());
        assert!(!RemoteError::api("timeout").is_fatal());
    }

    #[test]
    fn test_api_error_display() {
        let err = RemoteError::Api {
            message: "gateway down".to_string(),
            status: Some(503),
        };
        assert_eq!(err.to_string(), "API response error (503): gateway down");
        assert_eq!(
            RemoteError::api("oops").to_string(),
            "API response error: oops"
        );
    }

    #[test]
    fn test_remote_error_recoverability() {
        let transient = remote_error!(RemoteError::api("flaky"), "test");
        assert!(transient.is_recoverable());
        assert_eq!(transient.remote().map(|e| e.code()), Some("api_error"));

        let fatal = remote_error!(RemoteError::TwoFactorRequired, "test", "init");
        assert!(!fatal.is_recoverable());
        assert_eq!(
            fatal.context().operation.as_deref(),
            Some("init")
        );
    }
}
