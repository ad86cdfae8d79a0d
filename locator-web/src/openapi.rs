//! OpenAPI specification for the Locator web server

use crate::handlers::{HealthResponse, NowResponse};
use axum::response::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Locator API",
        description = "Last-known device location and metadata proxy",
        license(name = "MIT OR Apache-2.0")
    ),
    paths(
        crate::handlers::hello,
        crate::handlers::now,
        crate::handlers::health_check,
        crate::handlers::locate,
        crate::handlers::locate_index,
        crate::handlers::device,
    ),
    components(schemas(HealthResponse, NowResponse)),
    tags(
        (name = "Health", description = "Liveness and version"),
        (name = "Location", description = "Shared-location address lookups"),
        (name = "Device", description = "Device descriptor")
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document
pub async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
