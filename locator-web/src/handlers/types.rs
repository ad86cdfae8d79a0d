//! Response and query types shared by the handlers

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Whether an authenticated account session exists
    pub session_ready: bool,
    pub uptime_seconds: i64,
}

/// Server clock and deployment version
#[derive(Serialize, Deserialize, ToSchema)]
pub struct NowResponse {
    /// Seconds since the Unix epoch
    #[schema(example = 1700000000.25)]
    pub now: f64,
    #[schema(example = "v0")]
    pub version: String,
}

/// Location lookup query
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LocateQuery {
    /// 1-based index into the location list; below 1 returns every record
    pub idx: Option<i64>,
}
