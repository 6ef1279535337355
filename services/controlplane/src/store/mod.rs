use crate::model::{Connection, Consumer, PoisonMessageRecord, Producer, Station, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use juno_common::ids::ConnectionId;
use thiserror::Error;

pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Metadata store behind the control plane. Mutating bulk operations return
/// the number of records that actually changed state, so retried passes are
/// observable as zero-count updates.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn create_connection(&self, connection: Connection) -> StoreResult<Connection>;
    async fn get_connection(&self, id: &ConnectionId) -> StoreResult<Connection>;
    async fn list_active_connections(&self) -> StoreResult<Vec<Connection>>;
    async fn list_active_connections_by_user(&self, username: &str)
    -> StoreResult<Vec<Connection>>;
    async fn deactivate_connections(&self, ids: &[ConnectionId]) -> StoreResult<u64>;

    async fn create_producer(&self, producer: Producer) -> StoreResult<Producer>;
    async fn create_consumer(&self, consumer: Consumer) -> StoreResult<Consumer>;
    async fn list_active_producers(&self) -> StoreResult<Vec<Producer>>;
    async fn list_active_consumers(&self) -> StoreResult<Vec<Consumer>>;
    async fn deactivate_producers_by_connections(&self, ids: &[ConnectionId]) -> StoreResult<u64>;
    async fn deactivate_consumers_by_connections(&self, ids: &[ConnectionId]) -> StoreResult<u64>;

    async fn create_station(&self, station: Station) -> StoreResult<Station>;
    async fn get_station(&self, name: &str) -> StoreResult<Station>;
    async fn list_live_stations(&self) -> StoreResult<Vec<Station>>;
    async fn mark_stations_deleted(&self, names: &[String]) -> StoreResult<u64>;
    async fn reattribute_stations(&self, username: &str, replacement: &str) -> StoreResult<u64>;

    async fn insert_poison_record(
        &self,
        record: PoisonMessageRecord,
    ) -> StoreResult<PoisonMessageRecord>;
    async fn list_poison_records(&self) -> StoreResult<Vec<PoisonMessageRecord>>;
    async fn delete_poison_records_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64>;

    async fn create_user(&self, user: User) -> StoreResult<User>;
    async fn get_user(&self, username: &str) -> StoreResult<User>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn delete_user(&self, username: &str) -> StoreResult<()>;

    async fn health_check(&self) -> StoreResult<()>;
    fn is_durable(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}
