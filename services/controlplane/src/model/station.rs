//! Station model.
//!
//! # Purpose
//! A station is the durable named destination producers and consumers attach
//! to, backed by a broker stream of the same name. Deletion is a soft flag so
//! removal APIs and the reconciler stay idempotent.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Station {
    pub name: String,
    pub created_by_user: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl Station {
    pub fn new(name: impl Into<String>, created_by_user: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_by_user: created_by_user.into(),
            is_deleted: false,
            created_at: Utc::now(),
        }
    }
}
