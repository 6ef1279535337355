//! Platform user record.
//!
//! # Purpose
//! Users own stations and connections. Management users are humans operating
//! the dashboard; application users are service identities whose connections
//! are torn down when the user is removed.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Management,
    Application,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct User {
    pub username: String,
    pub user_type: UserType,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, user_type: UserType) -> Self {
        Self {
            username: username.into(),
            user_type,
            created_at: Utc::now(),
        }
    }
}
