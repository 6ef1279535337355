// In-process pub/sub transport engine with subject-based fanout.
// Subjects are created on demand by subscribers and torn down when the last
// subscriber leaves, so transient reply subjects never accumulate. Streams are
// a separate registry the control plane provisions and introspects.
use ahash::RandomState;
use arc_swap::ArcSwap;
use bytes::Bytes;
use hashbrown::HashMap;
use parking_lot::Mutex;
use slab::Slab;
use smallvec::SmallVec;
use std::sync::{Arc, Weak};
use std::time::SystemTime;
use tokio::sync::{RwLock, mpsc};

pub mod liveness;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("subscriber queue capacity must be non-zero")]
    CapacityTooSmall,
    #[error("stream not found: {stream}")]
    StreamNotFound { stream: String },
}

const DEFAULT_SUBSCRIBER_QUEUE_CAPACITY: usize = 1024;

/// One message handed to a subject subscriber. Requests carry the reply
/// subject the publisher is listening on.
#[derive(Debug, Clone)]
pub struct Delivery {
    payload: Bytes,
    reply: Option<String>,
}

impl Delivery {
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn into_payload(self) -> Bytes {
        self.payload
    }

    pub fn reply(&self) -> Option<&str> {
        self.reply.as_deref()
    }
}

#[derive(Debug)]
struct SubjectState {
    // Snapshot used by the publish hot path: lock-free read, no per-publish
    // allocation.
    subscribers_snapshot: ArcSwap<Vec<SubscriberEntry>>,
    // Inner registry mutated only on subscribe/unsubscribe paths.
    subscribers: Mutex<SubscriberRegistry>,
    // Per-subscriber bounded queue depth.
    subscriber_queue_capacity: usize,
}

#[derive(Debug, Default)]
struct SubscriberRegistry {
    senders: Slab<mpsc::Sender<Delivery>>,
}

#[derive(Debug, Clone)]
struct SubscriberEntry {
    id: usize,
    sender: mpsc::Sender<Delivery>,
}

impl SubjectState {
    fn new(subscriber_queue_capacity: usize) -> Self {
        Self {
            subscribers_snapshot: ArcSwap::from_pointee(Vec::new()),
            subscribers: Mutex::new(SubscriberRegistry::default()),
            subscriber_queue_capacity,
        }
    }

    fn register_subscriber(&self) -> (usize, mpsc::Receiver<Delivery>) {
        let mut state = self.subscribers.lock();
        let (tx, rx) = mpsc::channel(self.subscriber_queue_capacity);
        let id = state.senders.insert(tx);
        self.rebuild_subscriber_snapshot(&state);
        (id, rx)
    }

    fn remove_subscriber(&self, id: usize) {
        let mut state = self.subscribers.lock();
        if state.senders.contains(id) {
            state.senders.remove(id);
            self.rebuild_subscriber_snapshot(&state);
        }
    }

    fn remove_subscribers(&self, subscriber_ids: &[usize]) {
        let mut state = self.subscribers.lock();
        let mut removed = false;
        for id in subscriber_ids {
            if state.senders.contains(*id) {
                state.senders.remove(*id);
                removed = true;
            }
        }
        if removed {
            self.rebuild_subscriber_snapshot(&state);
        }
    }

    #[inline]
    fn subscriber_snapshot(&self) -> Arc<Vec<SubscriberEntry>> {
        self.subscribers_snapshot.load_full()
    }

    fn rebuild_subscriber_snapshot(&self, state: &SubscriberRegistry) {
        let mut snapshot = Vec::with_capacity(state.senders.len());
        for (id, sender) in state.senders.iter() {
            snapshot.push(SubscriberEntry {
                id,
                sender: sender.clone(),
            });
        }
        self.subscribers_snapshot.store(Arc::new(snapshot));
    }

    fn is_idle(&self) -> bool {
        self.subscribers.lock().senders.is_empty()
    }
}

/// RAII handle that unregisters a subject subscriber on drop.
#[derive(Debug)]
pub struct SubscriptionGuard {
    subject_state: Weak<SubjectState>,
    subscriber_id: usize,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(subject_state) = self.subject_state.upgrade() {
            subject_state.remove_subscriber(self.subscriber_id);
        }
    }
}

/// Live subject subscription. Dropping it unsubscribes; the idle subject entry
/// is pruned by the next subscribe call.
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::Receiver<Delivery>,
    #[allow(dead_code)]
    guard: SubscriptionGuard,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<Delivery> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> std::result::Result<Delivery, mpsc::error::TryRecvError> {
        self.receiver.try_recv()
    }
}

/// Stream introspection result, the positive half of `stream_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    pub name: String,
    pub created_at: SystemTime,
}

#[derive(Debug)]
struct StreamRecord {
    created_at: SystemTime,
}

#[derive(Debug)]
pub struct Engine {
    subjects: RwLock<HashMap<String, Arc<SubjectState>, RandomState>>,
    streams: RwLock<HashMap<String, StreamRecord, RandomState>>,
    subscriber_queue_capacity: usize,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            subjects: RwLock::new(HashMap::default()),
            streams: RwLock::new(HashMap::default()),
            subscriber_queue_capacity: DEFAULT_SUBSCRIBER_QUEUE_CAPACITY,
        }
    }

    pub fn with_subscriber_queue_capacity(mut self, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(EngineError::CapacityTooSmall);
        }
        self.subscriber_queue_capacity = capacity;
        Ok(self)
    }

    /// Publish a plain message. Returns the number of subscribers the message
    /// was enqueued to; a subject nobody listens on swallows the message.
    pub async fn publish(&self, subject: &str, payload: Bytes) -> usize {
        self.fan_out(subject, payload, None).await
    }

    /// Publish a request tagged with the reply subject the caller listens on.
    pub async fn publish_request(&self, subject: &str, reply: &str, payload: Bytes) -> usize {
        self.fan_out(subject, payload, Some(reply.to_string())).await
    }

    async fn fan_out(&self, subject: &str, payload: Bytes, reply: Option<String>) -> usize {
        let state = {
            let subjects = self.subjects.read().await;
            subjects.get(subject).cloned()
        };
        let Some(state) = state else {
            return 0;
        };

        let snapshot = state.subscriber_snapshot();
        let mut delivered = 0usize;
        let mut closed: SmallVec<[usize; 4]> = SmallVec::new();
        for entry in snapshot.iter() {
            let delivery = Delivery {
                payload: payload.clone(),
                reply: reply.clone(),
            };
            match entry.sender.try_send(delivery) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    // Drop-new admission: a slow subscriber loses the message
                    // rather than stalling the publisher.
                    metrics::counter!("juno_engine_dropped_total").increment(1);
                }
                Err(mpsc::error::TrySendError::Closed(_)) => closed.push(entry.id),
            }
        }
        if !closed.is_empty() {
            state.remove_subscribers(&closed);
        }
        metrics::counter!("juno_engine_deliveries_total").increment(delivered as u64);
        delivered
    }

    /// Open a subscription on a subject, creating the subject on demand.
    pub async fn subscribe(&self, subject: &str) -> Subscription {
        let mut subjects = self.subjects.write().await;
        // Idle entries left behind by dropped subscriptions are reclaimed
        // here, bounding the table at live subjects plus a handful of strays.
        subjects.retain(|_, state| !state.is_idle());
        let state = subjects
            .entry(subject.to_string())
            .or_insert_with(|| Arc::new(SubjectState::new(self.subscriber_queue_capacity)));
        let (subscriber_id, receiver) = state.register_subscriber();
        Subscription {
            receiver,
            guard: SubscriptionGuard {
                subject_state: Arc::downgrade(state),
                subscriber_id,
            },
        }
    }

    /// Register a stream. Registration is an upsert; re-registering an
    /// existing name keeps the original record.
    pub async fn register_stream(&self, name: impl Into<String>) {
        let mut streams = self.streams.write().await;
        streams.entry(name.into()).or_insert_with(|| StreamRecord {
            created_at: SystemTime::now(),
        });
        metrics::gauge!("juno_engine_streams").set(streams.len() as f64);
    }

    pub async fn remove_stream(&self, name: &str) -> Result<()> {
        let mut streams = self.streams.write().await;
        if streams.remove(name).is_none() {
            return Err(EngineError::StreamNotFound {
                stream: name.to_string(),
            });
        }
        metrics::gauge!("juno_engine_streams").set(streams.len() as f64);
        Ok(())
    }

    /// Look up a stream. Absence is reported as the distinguished
    /// `StreamNotFound` error so callers can treat it as an expected outcome.
    pub async fn stream_info(&self, name: &str) -> Result<StreamInfo> {
        let streams = self.streams.read().await;
        match streams.get(name) {
            Some(record) => Ok(StreamInfo {
                name: name.to_string(),
                created_at: record.created_at,
            }),
            None => Err(EngineError::StreamNotFound {
                stream: name.to_string(),
            }),
        }
    }

    pub async fn stream_exists(&self, name: &str) -> bool {
        self.streams.read().await.contains_key(name)
    }

    #[cfg(test)]
    async fn subject_count(&self) -> usize {
        self.subjects.read().await.len()
    }

    #[cfg(test)]
    async fn subscriber_count(&self, subject: &str) -> usize {
        let subjects = self.subjects.read().await;
        subjects
            .get(subject)
            .map(|state| state.subscribers.lock().senders.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn publish_delivers_to_subscriber() {
        let engine = Engine::new();
        let mut subscription = engine.subscribe("orders.events").await;

        let delivered = engine
            .publish("orders.events", Bytes::from_static(b"hello"))
            .await;
        assert_eq!(delivered, 1);

        let delivery = subscription.recv().await.expect("delivery");
        assert_eq!(delivery.payload().as_ref(), b"hello");
        assert!(delivery.reply().is_none());
    }

    #[tokio::test]
    async fn publish_request_carries_reply_subject() {
        let engine = Engine::new();
        let mut subscription = engine.subscribe("probe").await;

        engine
            .publish_request("probe", "probe_reply1", Bytes::from_static(b"id"))
            .await;

        let delivery = subscription.recv().await.expect("delivery");
        assert_eq!(delivery.reply(), Some("probe_reply1"));
        assert_eq!(delivery.into_payload().as_ref(), b"id");
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_swallowed() {
        let engine = Engine::new();
        let delivered = engine.publish("nobody", Bytes::from_static(b"x")).await;
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn every_subscriber_receives_a_copy() {
        let engine = Engine::new();
        let mut first = engine.subscribe("fanout").await;
        let mut second = engine.subscribe("fanout").await;

        let delivered = engine.publish("fanout", Bytes::from_static(b"m")).await;
        assert_eq!(delivered, 2);
        assert!(first.recv().await.is_some());
        assert!(second.recv().await.is_some());
    }

    #[tokio::test]
    async fn dropping_subscription_unsubscribes() {
        let engine = Engine::new();
        let subscription = engine.subscribe("transient_reply").await;
        assert_eq!(engine.subscriber_count("transient_reply").await, 1);

        drop(subscription);
        assert_eq!(engine.subscriber_count("transient_reply").await, 0);
        let delivered = engine
            .publish("transient_reply", Bytes::from_static(b"late"))
            .await;
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn idle_subjects_are_pruned_on_subscribe() {
        let engine = Engine::new();
        let subscription = engine.subscribe("reply_a").await;
        drop(subscription);
        assert_eq!(engine.subject_count().await, 1);

        let _live = engine.subscribe("reply_b").await;
        assert_eq!(engine.subject_count().await, 1);
    }

    #[tokio::test]
    async fn full_queue_drops_newest() {
        let engine = Engine::new()
            .with_subscriber_queue_capacity(1)
            .expect("capacity");
        let mut subscription = engine.subscribe("slow").await;

        let first = engine.publish("slow", Bytes::from_static(b"first")).await;
        let second = engine.publish("slow", Bytes::from_static(b"second")).await;
        assert_eq!(first, 1);
        assert_eq!(second, 0);

        let delivery = subscription.recv().await.expect("first delivery");
        assert_eq!(delivery.payload().as_ref(), b"first");
        assert!(subscription.try_recv().is_err());
    }

    #[tokio::test]
    async fn zero_capacity_is_rejected() {
        let err = Engine::new()
            .with_subscriber_queue_capacity(0)
            .expect_err("zero capacity");
        assert!(matches!(err, EngineError::CapacityTooSmall));
    }

    #[tokio::test]
    async fn stream_registry_reports_not_found() {
        let engine = Engine::new();
        engine.register_stream("orders").await;
        assert!(engine.stream_exists("orders").await);

        let info = engine.stream_info("orders").await.expect("info");
        assert_eq!(info.name, "orders");
        assert!(info.created_at <= SystemTime::now());

        engine.remove_stream("orders").await.expect("remove");
        let err = engine.stream_info("orders").await.expect_err("missing");
        assert!(matches!(err, EngineError::StreamNotFound { stream } if stream == "orders"));

        let err = engine.remove_stream("orders").await.expect_err("gone");
        assert!(matches!(err, EngineError::StreamNotFound { .. }));
    }

    #[tokio::test]
    async fn register_stream_is_an_upsert() {
        let engine = Engine::new();
        engine.register_stream("orders").await;
        let first = engine.stream_info("orders").await.expect("info");

        tokio::time::sleep(Duration::from_millis(5)).await;
        engine.register_stream("orders").await;
        let second = engine.stream_info("orders").await.expect("info");
        assert_eq!(first.created_at, second.created_at);
    }
}
