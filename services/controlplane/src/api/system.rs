//! System/health API handlers.
//!
//! # Purpose and responsibility
//! Small read-only endpoints that identify the service and report whether
//! its metadata store is reachable.
//!
//! # Key invariants and assumptions
//! - The health check may touch the store but must stay fast and
//!   side-effect free.
//!
//! # Security considerations
//! - These endpoints are read-only but still reveal deployment metadata.
use crate::api::error::{ApiError, api_internal};
use crate::api::types::{HealthStatus, SystemInfo};
use crate::app::AppState;
use axum::Json;
use axum::extract::State;

#[utoipa::path(
    get,
    path = "/v1/system/info",
    tag = "system",
    responses(
        (status = 200, description = "Service identity and storage backend", body = SystemInfo)
    )
)]
/// Return control-plane identity and storage capabilities.
///
/// # What it does
/// Exposes the API version and which store backend is serving metadata.
///
/// # Errors
/// - Does not return errors.
pub(crate) async fn system_info(State(state): State<AppState>) -> Json<SystemInfo> {
    // Answered from state alone; no store round trip.
    Json(SystemInfo {
        api_version: state.api_version.clone(),
        store_backend: state.store.backend_name().to_string(),
        durable_storage: state.store.is_durable(),
    })
}

#[utoipa::path(
    get,
    path = "/v1/system/health",
    tag = "system",
    responses(
        (status = 200, description = "Control plane health", body = HealthStatus)
    )
)]
/// Return control-plane health status.
///
/// # What it does
/// Probes the backing store and returns `ok` if healthy.
///
/// # Errors
/// - Returns 500 if the storage health check fails.
pub(crate) async fn system_health(
    State(state): State<AppState>,
) -> Result<Json<HealthStatus>, ApiError> {
    if let Err(err) = state.store.health_check().await {
        return Err(api_internal("storage unavailable", &err));
    }
    Ok(Json(HealthStatus {
        status: "ok".to_string(),
    }))
}
