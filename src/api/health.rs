//! Health check endpoint

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use super::response::{ApiResponse, HealthEnvelope};

#[derive(Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    /// Version of the service
    pub version: String,
}

/// Liveness check; does not touch storage
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthEnvelope)
    )
)]
pub async fn health_check() -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::success(
        "Service is healthy",
        HealthStatus {
            status: "ok".to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    ))
}
