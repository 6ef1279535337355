//! Liveness probe responder.
//!
//! Every engine host subscribes to the shared connection-status subject and
//! answers probes for the connections it currently hosts. A probe payload is
//! the raw connection id; the answer is published on the probe's reply
//! subject. Hosts that do not own the probed connection stay silent, so the
//! prober's timeout is the only signal that a connection is gone.

use crate::Engine;
use bytes::Bytes;
use juno_common::probe::{CONNECTION_STATUS_SUBJECT, PROBE_REPLY_PAYLOAD, connection_id_part};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Connection names hosted by this process, keyed by their full
/// `<id>::<label>` form. The responder matches probes against the id part.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    names: RwLock<HashSet<String>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: impl Into<String>) {
        self.names.write().insert(name.into());
    }

    pub fn deregister(&self, name: &str) {
        self.names.write().remove(name);
    }

    /// True when some locally hosted connection name carries this id.
    pub fn hosts(&self, connection_id: &str) -> bool {
        self.names
            .read()
            .iter()
            .any(|name| connection_id_part(name) == connection_id)
    }

    pub fn len(&self) -> usize {
        self.names.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.read().is_empty()
    }
}

/// Spawn the responder task. It runs until cancelled or until the status
/// subscription closes.
pub fn spawn_responder(
    engine: Arc<Engine>,
    registry: Arc<ConnectionRegistry>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut subscription = engine.subscribe(CONNECTION_STATUS_SUBJECT).await;
        tracing::debug!(subject = CONNECTION_STATUS_SUBJECT, "liveness responder started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("liveness responder stopping");
                    break;
                }
                delivery = subscription.recv() => {
                    let Some(delivery) = delivery else {
                        tracing::warn!("connection status subscription closed");
                        break;
                    };
                    answer_probe(&engine, &registry, delivery).await;
                }
            }
        }
    })
}

async fn answer_probe(engine: &Engine, registry: &ConnectionRegistry, delivery: crate::Delivery) {
    let Some(reply) = delivery.reply().map(str::to_string) else {
        // Not a request; nothing to answer.
        return;
    };
    let payload = delivery.into_payload();
    let probed = String::from_utf8_lossy(&payload);
    let probed = probed.trim();
    if probed.is_empty() || !registry.hosts(probed) {
        return;
    }
    let delivered = engine
        .publish(&reply, Bytes::from_static(PROBE_REPLY_PAYLOAD))
        .await;
    if delivered == 0 {
        // The prober gave up before our answer landed.
        tracing::debug!(connection_id = probed, "probe reply found no listener");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use juno_common::ids::ConnectionId;
    use juno_common::probe::{connection_name, reply_subject};
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread")]
    async fn responder_answers_for_hosted_connection() {
        let engine = Arc::new(Engine::new());
        let registry = Arc::new(ConnectionRegistry::new());
        let id = ConnectionId::new();
        registry.register(connection_name(&id.to_string(), "session-1"));

        let cancel = CancellationToken::new();
        let handle = spawn_responder(engine.clone(), registry, cancel.clone());

        let reply = reply_subject(CONNECTION_STATUS_SUBJECT);
        let mut reply_sub = engine.subscribe(&reply).await;
        engine
            .publish_request(
                CONNECTION_STATUS_SUBJECT,
                &reply,
                Bytes::from(id.to_string()),
            )
            .await;

        let answer = tokio::time::timeout(Duration::from_secs(1), reply_sub.recv())
            .await
            .expect("reply before timeout")
            .expect("reply delivery");
        assert_eq!(answer.payload().as_ref(), PROBE_REPLY_PAYLOAD);

        cancel.cancel();
        handle.await.expect("responder join");
    }

    #[tokio::test]
    async fn responder_stays_silent_for_unknown_connection() {
        let engine = Arc::new(Engine::new());
        let registry = Arc::new(ConnectionRegistry::new());
        registry.register(connection_name(&ConnectionId::new().to_string(), "local"));

        let cancel = CancellationToken::new();
        let handle = spawn_responder(engine.clone(), registry, cancel.clone());

        let reply = reply_subject(CONNECTION_STATUS_SUBJECT);
        let mut reply_sub = engine.subscribe(&reply).await;
        engine
            .publish_request(
                CONNECTION_STATUS_SUBJECT,
                &reply,
                Bytes::from(ConnectionId::new().to_string()),
            )
            .await;

        let outcome = tokio::time::timeout(Duration::from_millis(200), reply_sub.recv()).await;
        assert!(outcome.is_err(), "no reply expected for unknown id");

        cancel.cancel();
        handle.await.expect("responder join");
    }

    #[tokio::test]
    async fn responder_ignores_plain_publishes() {
        let engine = Arc::new(Engine::new());
        let registry = Arc::new(ConnectionRegistry::new());
        let id = ConnectionId::new();
        registry.register(connection_name(&id.to_string(), "session"));

        let cancel = CancellationToken::new();
        let handle = spawn_responder(engine.clone(), registry, cancel.clone());

        // No reply subject attached, so nothing should be published anywhere.
        engine
            .publish(CONNECTION_STATUS_SUBJECT, Bytes::from(id.to_string()))
            .await;

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("responder stops on cancel")
            .expect("responder join");
    }

    #[tokio::test]
    async fn registry_matches_on_id_part() {
        let registry = ConnectionRegistry::new();
        let id = ConnectionId::new();
        registry.register(connection_name(&id.to_string(), "sess-a"));
        registry.register(connection_name(&id.to_string(), "sess-b"));

        assert!(registry.hosts(&id.to_string()));
        assert!(!registry.hosts(&ConnectionId::new().to_string()));
        assert_eq!(registry.len(), 2);

        registry.deregister(&connection_name(&id.to_string(), "sess-a"));
        assert!(registry.hosts(&id.to_string()));
        registry.deregister(&connection_name(&id.to_string(), "sess-b"));
        assert!(!registry.hosts(&id.to_string()));
        assert!(registry.is_empty());
    }
}
