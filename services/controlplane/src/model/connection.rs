//! Client connection record.
//!
//! # Purpose
//! Tracks one live broker connection. The `name` is the wire identity the
//! connection registers under and always embeds the connection id, which is
//! what the liveness prober puts on the wire.
use chrono::{DateTime, Utc};
use juno_common::ids::ConnectionId;
use juno_common::probe::connection_name;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub name: String,
    pub created_by_user: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Connection {
    /// Build an active connection whose name carries the generated id.
    pub fn new(created_by_user: impl Into<String>, label: &str) -> Self {
        let id = ConnectionId::new();
        Self {
            id,
            name: connection_name(&id.to_string(), label),
            created_by_user: created_by_user.into(),
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
