//! OpenAPI schema aggregation for the control-plane API.
//!
//! # Purpose
//! Collects all routes and schema types into a single OpenAPI document for
//! docs and client generation.
use crate::api::{
    overview, stations, system,
    types::{
        ErrorResponse, HealthStatus, StationCreateRequest, StationListResponse, SystemInfo,
        UserCreateRequest, UserListResponse,
    },
    users,
};
use crate::dashboard::{OverviewSnapshot, StationOverview};
use crate::model::{Station, User, UserType};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "juno-controlplane",
        version = "v1",
        description = "Juno control plane HTTP API"
    ),
    paths(
        system::system_info,
        system::system_health,
        overview::get_overview,
        stations::list_stations,
        stations::create_station,
        stations::get_station,
        stations::delete_station,
        users::list_users,
        users::create_user,
        users::delete_user
    ),
    components(schemas(
        SystemInfo,
        HealthStatus,
        ErrorResponse,
        Station,
        StationCreateRequest,
        StationListResponse,
        User,
        UserType,
        UserCreateRequest,
        UserListResponse,
        OverviewSnapshot,
        StationOverview
    )),
    tags(
        (name = "system", description = "System and discovery endpoints"),
        (name = "overview", description = "Aggregated dashboard overview"),
        (name = "stations", description = "Station provisioning"),
        (name = "users", description = "User management")
    )
)]
pub struct ApiDoc;
