//! Station reconciler.
//!
//! # Purpose
//! Heals one direction of metadata drift: stations the metadata store still
//! lists as live whose backing stream is gone from the transport. Only the
//! distinguished not-found lookup result retires a station; any other lookup
//! failure leaves the station untouched for this pass.
use crate::store::{MetadataStore, StoreResult};
use crate::transport::Transport;

/// Retire every live station whose backing stream no longer exists.
/// Returns the names retired in this pass.
pub(super) async fn retire_orphaned_stations(
    store: &dyn MetadataStore,
    transport: &dyn Transport,
) -> StoreResult<Vec<String>> {
    let stations = store.list_live_stations().await?;
    let mut orphaned = Vec::new();
    for station in stations {
        match transport.stream_info(&station.name).await {
            Ok(_) => {}
            Err(err) if err.is_stream_not_found() => orphaned.push(station.name),
            Err(err) => {
                // A transient introspection failure is not orphaning.
                tracing::warn!(
                    station = %station.name,
                    error = %err,
                    "stream lookup failed, leaving station untouched"
                );
            }
        }
    }
    if !orphaned.is_empty() {
        store.mark_stations_deleted(&orphaned).await?;
    }
    Ok(orphaned)
}
