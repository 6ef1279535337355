//! User API handlers.
//!
//! # Purpose
//! User CRUD plus the removal cascade: deleting a user first rewrites its
//! station attribution and, for application users, deactivates the
//! connections its credentials hold.
use crate::api::error::{
    ApiError, api_conflict, api_internal, api_not_found, api_validation_error,
};
use crate::api::types::{UserCreateRequest, UserListResponse};
use crate::app::AppState;
use crate::model::User;
use crate::store::StoreError;
use crate::users::detach_user_resources;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

const MAX_USERNAME_LEN: usize = 64;

fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.is_empty() {
        return Err(api_validation_error("username must not be empty"));
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(api_validation_error("username too long"));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(api_validation_error(
            "username may contain only alphanumerics, '.', '_' and '-'",
        ));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/v1/users",
    tag = "users",
    responses(
        (status = 200, description = "List users", body = UserListResponse)
    )
)]
pub(crate) async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<UserListResponse>, ApiError> {
    let mut items = state
        .store
        .list_users()
        .await
        .map_err(|err| api_internal("failed to list users", &err))?;
    items.sort_by(|a, b| a.username.cmp(&b.username));
    Ok(Json(UserListResponse { items }))
}

#[utoipa::path(
    post,
    path = "/v1/users",
    tag = "users",
    request_body = UserCreateRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid username", body = crate::api::types::ErrorResponse),
        (status = 409, description = "User already exists", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<UserCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_username(&body.username)?;
    match state
        .store
        .create_user(User::new(body.username, body.user_type))
        .await
    {
        Ok(created) => Ok((StatusCode::CREATED, Json(created))),
        Err(StoreError::Conflict(_)) => Err(api_conflict("conflict", "user already exists")),
        Err(err) => Err(api_internal("failed to create user", &err)),
    }
}

#[utoipa::path(
    delete,
    path = "/v1/users/{username}",
    tag = "users",
    params(
        ("username" = String, Path, description = "Username")
    ),
    responses(
        (status = 204, description = "User deleted and resources detached"),
        (status = 404, description = "User not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_user(
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let user = match state.store.get_user(&username).await {
        Ok(user) => user,
        Err(StoreError::NotFound(_)) => return Err(api_not_found("user not found")),
        Err(err) => return Err(api_internal("failed to fetch user", &err)),
    };

    let outcome = detach_user_resources(state.store.as_ref(), &user)
        .await
        .map_err(|err| api_internal("failed to detach user resources", &err))?;
    tracing::info!(
        username = %user.username,
        stations_reattributed = outcome.stations_reattributed,
        connections_deactivated = outcome.resources.connections,
        "user resources detached"
    );

    state
        .store
        .delete_user(&username)
        .await
        .map_err(|err| api_internal("failed to delete user", &err))?;
    Ok(StatusCode::NO_CONTENT)
}
