//! Resource cascader.
//!
//! # Purpose
//! Soft-deletes everything a batch of zombie connections owns: the connection
//! records themselves, then the producers and consumers bound to them. The
//! three bulk updates stand alone; a failed one is logged and retried
//! implicitly on the next tick, when the prober flags the still-active
//! connections again.
use crate::store::MetadataStore;
use juno_common::ids::ConnectionId;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CascadeOutcome {
    pub connections: u64,
    pub producers: u64,
    pub consumers: u64,
}

impl CascadeOutcome {
    pub fn total(&self) -> u64 {
        self.connections + self.producers + self.consumers
    }
}

/// Deactivate the given connections and every producer/consumer they own.
/// Counts report actual state transitions, so re-running the same batch
/// reports zeros.
pub(crate) async fn deactivate_connection_resources(
    store: &dyn MetadataStore,
    zombies: &[ConnectionId],
) -> CascadeOutcome {
    let mut outcome = CascadeOutcome::default();
    if zombies.is_empty() {
        return outcome;
    }

    // Connections first by convention; readers tolerate the brief window
    // where a connection is inactive but its producers are not yet.
    match store.deactivate_connections(zombies).await {
        Ok(count) => outcome.connections = count,
        Err(err) => {
            tracing::warn!(error = %err, "failed to deactivate zombie connections");
        }
    }
    match store.deactivate_producers_by_connections(zombies).await {
        Ok(count) => outcome.producers = count,
        Err(err) => {
            tracing::warn!(error = %err, "failed to deactivate producers of zombie connections");
        }
    }
    match store.deactivate_consumers_by_connections(zombies).await {
        Ok(count) => outcome.consumers = count,
        Err(err) => {
            tracing::warn!(error = %err, "failed to deactivate consumers of zombie connections");
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Connection, Consumer, Producer};
    use crate::store::memory::InMemoryStore;

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let store = InMemoryStore::new();
        let outcome = deactivate_connection_resources(&store, &[]).await;
        assert_eq!(outcome, CascadeOutcome::default());
        assert_eq!(outcome.total(), 0);
    }

    #[tokio::test]
    async fn cascade_covers_owned_producers_and_consumers() {
        let store = InMemoryStore::new();
        let zombie = store
            .create_connection(Connection::new("app", "zombie"))
            .await
            .expect("connection");
        let survivor = store
            .create_connection(Connection::new("app", "survivor"))
            .await
            .expect("connection");

        store
            .create_producer(Producer::new("p-zombie", "orders", zombie.id))
            .await
            .expect("producer");
        store
            .create_producer(Producer::new("p-live", "orders", survivor.id))
            .await
            .expect("producer");
        store
            .create_consumer(Consumer::new("c-zombie", "orders", zombie.id))
            .await
            .expect("consumer");

        let outcome = deactivate_connection_resources(&store, &[zombie.id]).await;
        assert_eq!(
            outcome,
            CascadeOutcome {
                connections: 1,
                producers: 1,
                consumers: 1,
            }
        );

        assert!(!store.get_connection(&zombie.id).await.expect("get").is_active);
        assert!(store.get_connection(&survivor.id).await.expect("get").is_active);
        let active = store.list_active_producers().await.expect("producers");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "p-live");
    }

    #[tokio::test]
    async fn rerunning_the_same_batch_reports_zero() {
        let store = InMemoryStore::new();
        let zombie = store
            .create_connection(Connection::new("app", "zombie"))
            .await
            .expect("connection");

        let first = deactivate_connection_resources(&store, &[zombie.id]).await;
        assert_eq!(first.connections, 1);

        let second = deactivate_connection_resources(&store, &[zombie.id]).await;
        assert_eq!(second, CascadeOutcome::default());
    }
}
