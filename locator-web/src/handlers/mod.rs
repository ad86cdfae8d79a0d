//! HTTP request handlers for the Locator web server

pub mod device;
pub mod health;
pub mod location;
pub mod types;

pub use device::*;
pub use health::*;
pub use location::*;
pub use types::*;
