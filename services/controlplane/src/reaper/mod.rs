//! Background liveness-and-reconciliation reaper.
//!
//! # Purpose
//! On a fixed tick, confirms every metadata-active connection still exists on
//! the transport, soft-deletes the resources of the ones that have silently
//! died, ages poison message records out of retention, and retires stations
//! whose backing stream is gone.
//!
//! # Failure policy
//! No stage failure is fatal. A failed stage is logged and the tick moves on
//! to the next stage, then to the next tick. The only ways out of the loop
//! are process shutdown via the cancellation token.
//!
//! # Concurrency
//! One reaper task per process. Probing is sequential so at most one reply
//! subscription is open at a time. Running several reaper processes against
//! one store is not coordinated and should be avoided.
pub(crate) mod cascade;
mod config;
mod probe;
mod reconcile;
mod sweep;

pub use cascade::CascadeOutcome;
pub use config::ReaperConfig;

use crate::store::MetadataStore;
use crate::transport::Transport;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct Reaper {
    store: Arc<dyn MetadataStore + Send + Sync>,
    transport: Arc<dyn Transport + Send + Sync>,
    config: ReaperConfig,
}

impl Reaper {
    pub fn new(
        store: Arc<dyn MetadataStore + Send + Sync>,
        transport: Arc<dyn Transport + Send + Sync>,
        config: ReaperConfig,
    ) -> Self {
        Self {
            store,
            transport,
            config,
        }
    }

    /// Run the tick loop until the token is cancelled.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(
            interval_secs = self.config.tick_interval.as_secs(),
            probe_timeout_secs = self.config.probe_timeout.as_secs(),
            "reaper started"
        );
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.tick_interval) => {}
            }
            self.tick(&cancel).await;
        }
        tracing::info!("reaper stopped");
    }

    /// One full pass: probe, cascade, sweep, reconcile. The token is checked
    /// between stages so shutdown never waits for a full tick.
    pub async fn tick(&self, cancel: &CancellationToken) {
        if cancel.is_cancelled() {
            return;
        }
        metrics::counter!("juno_reaper_ticks_total").increment(1);

        match probe::collect_zombies(
            self.store.as_ref(),
            self.transport.as_ref(),
            self.config.probe_timeout,
            cancel,
        )
        .await
        {
            Ok(zombies) if !zombies.is_empty() => {
                tracing::warn!(count = zombies.len(), "zombie connections detected");
                metrics::counter!("juno_zombie_connections_total")
                    .increment(zombies.len() as u64);
                let outcome =
                    cascade::deactivate_connection_resources(self.store.as_ref(), &zombies).await;
                tracing::info!(
                    connections = outcome.connections,
                    producers = outcome.producers,
                    consumers = outcome.consumers,
                    "zombie resources deactivated"
                );
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(error = %err, "liveness probe pass failed");
            }
        }

        if cancel.is_cancelled() {
            return;
        }
        match sweep::sweep_expired_poison_records(self.store.as_ref(), self.config.poison_retention)
            .await
        {
            Ok(removed) if removed > 0 => {
                metrics::counter!("juno_poison_records_swept_total").increment(removed);
                tracing::info!(removed, "expired poison message records swept");
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(error = %err, "poison record sweep failed");
            }
        }

        if cancel.is_cancelled() {
            return;
        }
        match reconcile::retire_orphaned_stations(self.store.as_ref(), self.transport.as_ref())
            .await
        {
            Ok(retired) if !retired.is_empty() => {
                metrics::counter!("juno_stations_retired_total").increment(retired.len() as u64);
                tracing::warn!(stations = ?retired, "orphaned stations retired");
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(error = %err, "station reconciliation failed");
            }
        }
    }
}
