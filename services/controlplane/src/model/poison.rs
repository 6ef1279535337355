use chrono::{DateTime, Utc};
use juno_common::ids::RecordId;
use serde::{Deserialize, Serialize};

// Dead-letter record for a message that exhausted delivery attempts. Kept for
// operator inspection until the retention sweeper ages it out.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PoisonMessageRecord {
    pub id: RecordId,
    pub station_name: String,
    pub producer_name: String,
    pub message_seq: u64,
    pub creation_date: DateTime<Utc>,
}

impl PoisonMessageRecord {
    pub fn new(
        station_name: impl Into<String>,
        producer_name: impl Into<String>,
        message_seq: u64,
    ) -> Self {
        Self {
            id: RecordId::new(),
            station_name: station_name.into(),
            producer_name: producer_name.into(),
            message_seq,
            creation_date: Utc::now(),
        }
    }
}
