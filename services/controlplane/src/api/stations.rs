//! Station API handlers.
//!
//! # Purpose
//! Implements station provisioning and removal. Creating a station provisions
//! the backing stream on the transport; deleting one tears the stream down
//! and soft-deletes the metadata record.
use crate::api::error::{
    ApiError, api_conflict, api_internal, api_internal_message, api_not_found,
    api_validation_error,
};
use crate::api::types::{StationCreateRequest, StationListResponse};
use crate::app::AppState;
use crate::model::Station;
use crate::store::StoreError;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

const MAX_STATION_NAME_LEN: usize = 128;

fn validate_station_name(name: &str) -> Result<(), ApiError> {
    if name.is_empty() {
        return Err(api_validation_error("station name must not be empty"));
    }
    if name.len() > MAX_STATION_NAME_LEN {
        return Err(api_validation_error("station name too long"));
    }
    // Names double as stream and subject identifiers on the transport.
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(api_validation_error(
            "station name may contain only alphanumerics, '.', '_' and '-'",
        ));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/v1/stations",
    tag = "stations",
    responses(
        (status = 200, description = "List live stations", body = StationListResponse)
    )
)]
pub(crate) async fn list_stations(
    State(state): State<AppState>,
) -> Result<Json<StationListResponse>, ApiError> {
    let mut items = state
        .store
        .list_live_stations()
        .await
        .map_err(|err| api_internal("failed to list stations", &err))?;
    items.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(StationListResponse { items }))
}

#[utoipa::path(
    post,
    path = "/v1/stations",
    tag = "stations",
    request_body = StationCreateRequest,
    responses(
        (status = 201, description = "Station created", body = Station),
        (status = 400, description = "Invalid station name", body = crate::api::types::ErrorResponse),
        (status = 409, description = "Station already exists", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_station(
    State(state): State<AppState>,
    Json(body): Json<StationCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_station_name(&body.name)?;
    let station = Station::new(body.name, body.created_by_user);
    let created = match state.store.create_station(station).await {
        Ok(created) => created,
        Err(StoreError::Conflict(_)) => {
            return Err(api_conflict("conflict", "station already exists"));
        }
        Err(err) => return Err(api_internal("failed to create station", &err)),
    };

    if let Err(err) = state.transport.create_stream(&created.name).await {
        // Roll the metadata back so the name is not squatted by a station
        // with no backing stream.
        tracing::error!(station = %created.name, error = %err, "stream provisioning failed");
        let _ = state
            .store
            .mark_stations_deleted(&[created.name.clone()])
            .await;
        return Err(api_internal_message("failed to provision backing stream"));
    }
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/v1/stations/{name}",
    tag = "stations",
    params(
        ("name" = String, Path, description = "Station name")
    ),
    responses(
        (status = 200, description = "Fetch station", body = Station),
        (status = 404, description = "Station not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_station(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Station>, ApiError> {
    match state.store.get_station(&name).await {
        Ok(station) => Ok(Json(station)),
        Err(StoreError::NotFound(_)) => Err(api_not_found("station not found")),
        Err(err) => Err(api_internal("failed to fetch station", &err)),
    }
}

#[utoipa::path(
    delete,
    path = "/v1/stations/{name}",
    tag = "stations",
    params(
        ("name" = String, Path, description = "Station name")
    ),
    responses(
        (status = 204, description = "Station deleted"),
        (status = 404, description = "Station not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_station(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    match state.store.get_station(&name).await {
        Ok(_) => {}
        Err(StoreError::NotFound(_)) => return Err(api_not_found("station not found")),
        Err(err) => return Err(api_internal("failed to fetch station", &err)),
    }

    // The stream may already be gone if the station was orphaned; that is
    // the state deletion converges to anyway.
    if let Err(err) = state.transport.delete_stream(&name).await {
        if !err.is_stream_not_found() {
            tracing::error!(station = %name, error = %err, "stream teardown failed");
            return Err(api_internal_message("failed to delete backing stream"));
        }
    }

    state
        .store
        .mark_stations_deleted(&[name])
        .await
        .map_err(|err| api_internal("failed to delete station", &err))?;
    Ok(StatusCode::NO_CONTENT)
}
