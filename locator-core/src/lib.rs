//! Locator Core - shared data model, error taxonomy, retry policy and ambient setup
//!
//! Everything here is independent of the remote account service and of the
//! HTTP surface.

pub mod address;
pub mod config;
pub mod error;
pub mod logging;
pub mod retry;
pub mod types;

pub use address::*;
pub use config::*;
pub use error::*;
pub use logging::*;
pub use retry::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use chrono;
pub use tokio;
pub use tracing;
