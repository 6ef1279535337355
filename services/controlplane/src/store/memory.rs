//! In-memory implementation of the metadata store.
//!
//! # Purpose
//! This store implements the `MetadataStore` trait entirely in memory using
//! `HashMap`s guarded by `tokio::sync::RwLock`. It exists for:
//! - local development and tests (no external dependencies)
//! - deployments where durability is not required
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart.
//! - **Single-process consistency**: operations are consistent within one
//!   process. We use write locks for mutations and read locks for reads.
//!
//! # Soft deletion
//! Connections, producers, and consumers deactivate in place (`is_active`
//! flips to false) and stations carry an `is_deleted` flag. Bulk updates are
//! filter-scoped: a record that already left the live state is not counted
//! again, so the reaper can retry a pass without double-reporting.
//!
//! # Metrics
//! This store updates a small set of gauges to keep observability behavior
//! consistent with durable backends.
use super::{MetadataStore, StoreError, StoreResult};
use crate::model::{Connection, Consumer, PoisonMessageRecord, Producer, Station, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use juno_common::ids::{ConnectionId, ConsumerId, ProducerId, RecordId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory metadata store.
///
/// All maps are wrapped in `Arc<RwLock<...>>` so:
/// - the store can be shared across async request handlers and the reaper
/// - reads can proceed concurrently
/// - writes are serialized to preserve invariants
pub struct InMemoryStore {
    /// Connections keyed by connection id.
    connections: Arc<RwLock<HashMap<ConnectionId, Connection>>>,
    /// Producers keyed by producer id.
    producers: Arc<RwLock<HashMap<ProducerId, Producer>>>,
    /// Consumers keyed by consumer id.
    consumers: Arc<RwLock<HashMap<ConsumerId, Consumer>>>,
    /// Stations keyed by station name. Soft-deleted stations stay in the map
    /// until their name is reused.
    stations: Arc<RwLock<HashMap<String, Station>>>,
    /// Poison message records keyed by record id.
    poison_records: Arc<RwLock<HashMap<RecordId, PoisonMessageRecord>>>,
    /// Users keyed by username.
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            producers: Arc::new(RwLock::new(HashMap::new())),
            consumers: Arc::new(RwLock::new(HashMap::new())),
            stations: Arc::new(RwLock::new(HashMap::new())),
            poison_records: Arc::new(RwLock::new(HashMap::new())),
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn record_station_gauge(stations: &HashMap<String, Station>) {
        let live = stations.values().filter(|s| !s.is_deleted).count();
        metrics::gauge!("juno_stations_live").set(live as f64);
    }

    fn record_poison_gauge(records: &HashMap<RecordId, PoisonMessageRecord>) {
        metrics::gauge!("juno_poison_records").set(records.len() as f64);
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataStore for InMemoryStore {
    async fn create_connection(&self, connection: Connection) -> StoreResult<Connection> {
        let mut connections = self.connections.write().await;
        if connections.contains_key(&connection.id) {
            return Err(StoreError::Conflict("connection exists".into()));
        }
        connections.insert(connection.id, connection.clone());
        Ok(connection)
    }

    async fn get_connection(&self, id: &ConnectionId) -> StoreResult<Connection> {
        self.connections
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("connection".into()))
    }

    async fn list_active_connections(&self) -> StoreResult<Vec<Connection>> {
        Ok(self
            .connections
            .read()
            .await
            .values()
            .filter(|c| c.is_active)
            .cloned()
            .collect())
    }

    async fn list_active_connections_by_user(
        &self,
        username: &str,
    ) -> StoreResult<Vec<Connection>> {
        Ok(self
            .connections
            .read()
            .await
            .values()
            .filter(|c| c.is_active && c.created_by_user == username)
            .cloned()
            .collect())
    }

    async fn deactivate_connections(&self, ids: &[ConnectionId]) -> StoreResult<u64> {
        // Filter-scoped bulk update: only active records in the id set flip,
        // and only those transitions are counted.
        let mut connections = self.connections.write().await;
        let mut changed = 0u64;
        for id in ids {
            if let Some(connection) = connections.get_mut(id) {
                if connection.is_active {
                    connection.is_active = false;
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    async fn create_producer(&self, producer: Producer) -> StoreResult<Producer> {
        let mut producers = self.producers.write().await;
        if producers.contains_key(&producer.id) {
            return Err(StoreError::Conflict("producer exists".into()));
        }
        producers.insert(producer.id, producer.clone());
        Ok(producer)
    }

    async fn create_consumer(&self, consumer: Consumer) -> StoreResult<Consumer> {
        let mut consumers = self.consumers.write().await;
        if consumers.contains_key(&consumer.id) {
            return Err(StoreError::Conflict("consumer exists".into()));
        }
        consumers.insert(consumer.id, consumer.clone());
        Ok(consumer)
    }

    async fn list_active_producers(&self) -> StoreResult<Vec<Producer>> {
        Ok(self
            .producers
            .read()
            .await
            .values()
            .filter(|p| p.is_active)
            .cloned()
            .collect())
    }

    async fn list_active_consumers(&self) -> StoreResult<Vec<Consumer>> {
        Ok(self
            .consumers
            .read()
            .await
            .values()
            .filter(|c| c.is_active)
            .cloned()
            .collect())
    }

    async fn deactivate_producers_by_connections(&self, ids: &[ConnectionId]) -> StoreResult<u64> {
        let mut producers = self.producers.write().await;
        let mut changed = 0u64;
        for producer in producers.values_mut() {
            if producer.is_active && ids.contains(&producer.connection_id) {
                producer.is_active = false;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn deactivate_consumers_by_connections(&self, ids: &[ConnectionId]) -> StoreResult<u64> {
        let mut consumers = self.consumers.write().await;
        let mut changed = 0u64;
        for consumer in consumers.values_mut() {
            if consumer.is_active && ids.contains(&consumer.connection_id) {
                consumer.is_active = false;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn create_station(&self, station: Station) -> StoreResult<Station> {
        let mut stations = self.stations.write().await;
        match stations.get(&station.name) {
            Some(existing) if !existing.is_deleted => {
                return Err(StoreError::Conflict("station exists".into()));
            }
            // A soft-deleted station frees its name; creating it again
            // replaces the tombstone.
            _ => {}
        }
        stations.insert(station.name.clone(), station.clone());
        Self::record_station_gauge(&stations);
        Ok(station)
    }

    async fn get_station(&self, name: &str) -> StoreResult<Station> {
        // Soft-deleted stations are invisible to readers.
        self.stations
            .read()
            .await
            .get(name)
            .filter(|s| !s.is_deleted)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("station".into()))
    }

    async fn list_live_stations(&self) -> StoreResult<Vec<Station>> {
        Ok(self
            .stations
            .read()
            .await
            .values()
            .filter(|s| !s.is_deleted)
            .cloned()
            .collect())
    }

    async fn mark_stations_deleted(&self, names: &[String]) -> StoreResult<u64> {
        let mut stations = self.stations.write().await;
        let mut changed = 0u64;
        for name in names {
            if let Some(station) = stations.get_mut(name) {
                if !station.is_deleted {
                    station.is_deleted = true;
                    changed += 1;
                }
            }
        }
        if changed > 0 {
            Self::record_station_gauge(&stations);
        }
        Ok(changed)
    }

    async fn reattribute_stations(&self, username: &str, replacement: &str) -> StoreResult<u64> {
        // Rewrites ownership on every station the user created, deleted ones
        // included, so history keeps pointing at a resolvable name.
        let mut stations = self.stations.write().await;
        let mut changed = 0u64;
        for station in stations.values_mut() {
            if station.created_by_user == username {
                station.created_by_user = replacement.to_string();
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn insert_poison_record(
        &self,
        record: PoisonMessageRecord,
    ) -> StoreResult<PoisonMessageRecord> {
        let mut records = self.poison_records.write().await;
        records.insert(record.id, record.clone());
        Self::record_poison_gauge(&records);
        Ok(record)
    }

    async fn list_poison_records(&self) -> StoreResult<Vec<PoisonMessageRecord>> {
        Ok(self.poison_records.read().await.values().cloned().collect())
    }

    async fn delete_poison_records_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        // Inclusive boundary: a record created exactly at the cutoff is
        // already out of retention.
        let mut records = self.poison_records.write().await;
        let before = records.len();
        records.retain(|_, record| record.creation_date > cutoff);
        let removed = (before - records.len()) as u64;
        if removed > 0 {
            Self::record_poison_gauge(&records);
        }
        Ok(removed)
    }

    async fn create_user(&self, user: User) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(StoreError::Conflict("user exists".into()));
        }
        users.insert(user.username.clone(), user.clone());
        Ok(user)
    }

    async fn get_user(&self, username: &str) -> StoreResult<User> {
        self.users
            .read()
            .await
            .get(username)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("user".into()))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn delete_user(&self, username: &str) -> StoreResult<()> {
        let mut users = self.users.write().await;
        if users.remove(username).is_none() {
            return Err(StoreError::NotFound("user".into()));
        }
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserType;
    use chrono::Duration;

    #[tokio::test]
    async fn connection_lifecycle_and_bulk_deactivation() {
        let store = InMemoryStore::new();
        let first = store
            .create_connection(Connection::new("app-user", "sess-1"))
            .await
            .expect("connection");
        let second = store
            .create_connection(Connection::new("app-user", "sess-2"))
            .await
            .expect("connection");

        assert_eq!(
            store.list_active_connections().await.expect("list").len(),
            2
        );

        let changed = store
            .deactivate_connections(&[first.id])
            .await
            .expect("deactivate");
        assert_eq!(changed, 1);
        assert!(!store.get_connection(&first.id).await.expect("get").is_active);
        assert!(store.get_connection(&second.id).await.expect("get").is_active);

        // Re-running the same batch changes nothing.
        let changed = store
            .deactivate_connections(&[first.id])
            .await
            .expect("deactivate again");
        assert_eq!(changed, 0);
        assert_eq!(
            store.list_active_connections().await.expect("list").len(),
            1
        );
    }

    #[tokio::test]
    async fn list_active_connections_by_user_filters_owner() {
        let store = InMemoryStore::new();
        store
            .create_connection(Connection::new("svc-a", "one"))
            .await
            .expect("connection");
        store
            .create_connection(Connection::new("svc-b", "two"))
            .await
            .expect("connection");
        let dropped = store
            .create_connection(Connection::new("svc-a", "three"))
            .await
            .expect("connection");
        store
            .deactivate_connections(&[dropped.id])
            .await
            .expect("deactivate");

        let owned = store
            .list_active_connections_by_user("svc-a")
            .await
            .expect("list");
        assert_eq!(owned.len(), 1);
        assert!(owned[0].name.ends_with("one"));
    }

    #[tokio::test]
    async fn producers_and_consumers_deactivate_by_connection() {
        let store = InMemoryStore::new();
        let doomed = store
            .create_connection(Connection::new("app", "doomed"))
            .await
            .expect("connection");
        let healthy = store
            .create_connection(Connection::new("app", "healthy"))
            .await
            .expect("connection");

        store
            .create_producer(Producer::new("p1", "orders", doomed.id))
            .await
            .expect("producer");
        store
            .create_producer(Producer::new("p2", "orders", healthy.id))
            .await
            .expect("producer");
        store
            .create_consumer(Consumer::new("c1", "orders", doomed.id))
            .await
            .expect("consumer");
        store
            .create_consumer(Consumer::new("c2", "billing", doomed.id))
            .await
            .expect("consumer");

        let producers = store
            .deactivate_producers_by_connections(&[doomed.id])
            .await
            .expect("producers");
        let consumers = store
            .deactivate_consumers_by_connections(&[doomed.id])
            .await
            .expect("consumers");
        assert_eq!(producers, 1);
        assert_eq!(consumers, 2);

        let active = store.list_active_producers().await.expect("active");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "p2");
        assert!(store.list_active_consumers().await.expect("active").is_empty());
    }

    #[tokio::test]
    async fn station_conflict_soft_delete_and_revival() {
        let store = InMemoryStore::new();
        store
            .create_station(Station::new("orders", "ops"))
            .await
            .expect("station");

        let err = store
            .create_station(Station::new("orders", "ops"))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, StoreError::Conflict(_)));

        let changed = store
            .mark_stations_deleted(&["orders".to_string()])
            .await
            .expect("delete");
        assert_eq!(changed, 1);
        let err = store.get_station("orders").await.expect_err("tombstoned");
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(store.list_live_stations().await.expect("live").is_empty());

        // Re-deleting a tombstone and deleting an unknown name are no-ops.
        let changed = store
            .mark_stations_deleted(&["orders".to_string(), "missing".to_string()])
            .await
            .expect("redelete");
        assert_eq!(changed, 0);

        // The name is free again after soft deletion.
        store
            .create_station(Station::new("orders", "ops2"))
            .await
            .expect("revival");
        let revived = store.get_station("orders").await.expect("revived");
        assert_eq!(revived.created_by_user, "ops2");
        assert!(!revived.is_deleted);
    }

    #[tokio::test]
    async fn reattribute_stations_rewrites_owner() {
        let store = InMemoryStore::new();
        store
            .create_station(Station::new("orders", "alice"))
            .await
            .expect("station");
        store
            .create_station(Station::new("billing", "alice"))
            .await
            .expect("station");
        store
            .create_station(Station::new("audit", "bob"))
            .await
            .expect("station");
        store
            .mark_stations_deleted(&["billing".to_string()])
            .await
            .expect("delete");

        let changed = store
            .reattribute_stations("alice", "alice(deleted)")
            .await
            .expect("reattribute");
        assert_eq!(changed, 2);

        let orders = store.get_station("orders").await.expect("orders");
        assert_eq!(orders.created_by_user, "alice(deleted)");
        let audit = store.get_station("audit").await.expect("audit");
        assert_eq!(audit.created_by_user, "bob");
    }

    #[tokio::test]
    async fn poison_retention_boundary_is_inclusive() {
        let store = InMemoryStore::new();
        let cutoff = Utc::now() - Duration::hours(24);

        let mut expired = PoisonMessageRecord::new("orders", "p1", 7);
        expired.creation_date = cutoff - Duration::hours(1);
        let mut boundary = PoisonMessageRecord::new("orders", "p1", 8);
        boundary.creation_date = cutoff;
        let mut fresh = PoisonMessageRecord::new("orders", "p1", 9);
        fresh.creation_date = cutoff + Duration::hours(1);

        for record in [expired, boundary, fresh.clone()] {
            store.insert_poison_record(record).await.expect("insert");
        }

        let removed = store
            .delete_poison_records_before(cutoff)
            .await
            .expect("sweep");
        assert_eq!(removed, 2);

        let remaining = store.list_poison_records().await.expect("list");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, fresh.id);
    }

    #[tokio::test]
    async fn user_crud_and_conflicts() {
        let store = InMemoryStore::new();
        store
            .create_user(User::new("alice", UserType::Management))
            .await
            .expect("user");

        let err = store
            .create_user(User::new("alice", UserType::Application))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, StoreError::Conflict(_)));

        let user = store.get_user("alice").await.expect("get");
        assert_eq!(user.user_type, UserType::Management);
        assert_eq!(store.list_users().await.expect("list").len(), 1);

        store.delete_user("alice").await.expect("delete");
        let err = store.delete_user("alice").await.expect_err("missing");
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn backend_health_and_identity() {
        let store = InMemoryStore::new();
        store.health_check().await.expect("health");
        assert!(!store.is_durable());
        assert_eq!(store.backend_name(), "memory");
    }
}
