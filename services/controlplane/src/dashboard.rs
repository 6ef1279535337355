//! Dashboard overview aggregation.
//!
//! # Purpose
//! Condenses reconciled metadata into one snapshot the overview endpoint
//! serves. The refresher runs on its own timer, independent of the reaper
//! tick, and is a pure reader: it tolerates observing state mid-cascade. A
//! failed refresh keeps the previous snapshot in place.
use crate::store::{MetadataStore, StoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct StationOverview {
    pub name: String,
    pub active_producers: u64,
    pub active_consumers: u64,
    pub poison_messages: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct OverviewSnapshot {
    pub refreshed_at: DateTime<Utc>,
    pub active_connections: u64,
    pub stations: Vec<StationOverview>,
}

impl Default for OverviewSnapshot {
    fn default() -> Self {
        Self {
            refreshed_at: Utc::now(),
            active_connections: 0,
            stations: Vec::new(),
        }
    }
}

/// Aggregate the current overview from the store, stations sorted by name.
pub async fn collect_overview(store: &dyn MetadataStore) -> StoreResult<OverviewSnapshot> {
    let connections = store.list_active_connections().await?;
    let stations = store.list_live_stations().await?;
    let producers = store.list_active_producers().await?;
    let consumers = store.list_active_consumers().await?;
    let poison_records = store.list_poison_records().await?;

    let mut producer_counts: HashMap<&str, u64> = HashMap::new();
    for producer in &producers {
        *producer_counts
            .entry(producer.station_name.as_str())
            .or_default() += 1;
    }
    let mut consumer_counts: HashMap<&str, u64> = HashMap::new();
    for consumer in &consumers {
        *consumer_counts
            .entry(consumer.station_name.as_str())
            .or_default() += 1;
    }
    let mut poison_counts: HashMap<&str, u64> = HashMap::new();
    for record in &poison_records {
        *poison_counts
            .entry(record.station_name.as_str())
            .or_default() += 1;
    }

    let mut items: Vec<StationOverview> = stations
        .iter()
        .map(|station| StationOverview {
            name: station.name.clone(),
            active_producers: producer_counts
                .get(station.name.as_str())
                .copied()
                .unwrap_or(0),
            active_consumers: consumer_counts
                .get(station.name.as_str())
                .copied()
                .unwrap_or(0),
            poison_messages: poison_counts
                .get(station.name.as_str())
                .copied()
                .unwrap_or(0),
        })
        .collect();
    items.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(OverviewSnapshot {
        refreshed_at: Utc::now(),
        active_connections: connections.len() as u64,
        stations: items,
    })
}

/// Spawn the refresher task. It publishes an eager first snapshot, then one
/// per interval, until cancelled. Handlers read the latest via the receiver.
pub fn spawn_refresher(
    store: Arc<dyn MetadataStore + Send + Sync>,
    interval: Duration,
    cancel: CancellationToken,
) -> (watch::Receiver<OverviewSnapshot>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(OverviewSnapshot::default());
    let handle = tokio::spawn(async move {
        loop {
            match collect_overview(store.as_ref()).await {
                Ok(snapshot) => {
                    metrics::gauge!("juno_active_connections")
                        .set(snapshot.active_connections as f64);
                    // Send fails only when every receiver is gone; the loop
                    // still runs until cancellation for a clean shutdown.
                    let _ = tx.send(snapshot);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "overview refresh failed, keeping last snapshot");
                }
            }
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }
    });
    (rx, handle)
}
