use chrono::{DateTime, Utc};
use juno_common::ids::{ConnectionId, ConsumerId};
use serde::{Deserialize, Serialize};

// Consumer attached to a station through a client connection.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Consumer {
    pub id: ConsumerId,
    pub name: String,
    pub station_name: String,
    pub connection_id: ConnectionId,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Consumer {
    pub fn new(
        name: impl Into<String>,
        station_name: impl Into<String>,
        connection_id: ConnectionId,
    ) -> Self {
        Self {
            id: ConsumerId::new(),
            name: name.into(),
            station_name: station_name.into(),
            connection_id,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
