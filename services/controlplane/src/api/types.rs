//! HTTP API request/response types.
//!
//! # Purpose
//! Defines shared payload shapes for the control-plane REST API and OpenAPI
//! schema generation.
use crate::model::{Station, User, UserType};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SystemInfo {
    pub api_version: String,
    pub store_backend: String,
    pub durable_storage: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct StationCreateRequest {
    pub name: String,
    pub created_by_user: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct StationListResponse {
    pub items: Vec<Station>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct UserCreateRequest {
    pub username: String,
    pub user_type: UserType,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct UserListResponse {
    pub items: Vec<User>,
}
