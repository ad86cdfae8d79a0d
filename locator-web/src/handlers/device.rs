//! Device descriptor handler

use crate::{AppState, WebResult};
use axum::extract::State;

/// String form of the account's device, or `None` when it could not be read
#[utoipa::path(
    get,
    path = "/device",
    tag = "Device",
    responses(
        (status = 200, description = "Device description", body = String, content_type = "text/plain"),
        (status = 502, description = "The account session could not be established")
    )
)]
pub async fn device(State(state): State<AppState>) -> WebResult<String> {
    let device = state.sessions.fetch_device().await?;
    Ok(device.map_or_else(|| "None".to_string(), |d| d.to_string()))
}
