use chrono::{DateTime, Utc};
use juno_common::ids::{ConnectionId, ProducerId};
use serde::{Deserialize, Serialize};

// Producer attached to a station through a client connection.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Producer {
    pub id: ProducerId,
    pub name: String,
    pub station_name: String,
    pub connection_id: ConnectionId,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Producer {
    pub fn new(
        name: impl Into<String>,
        station_name: impl Into<String>,
        connection_id: ConnectionId,
    ) -> Self {
        Self {
            id: ProducerId::new(),
            name: name.into(),
            station_name: station_name.into(),
            connection_id,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
