//! Retention sweeper for poison message records.
use crate::store::{MetadataStore, StoreResult};
use chrono::Utc;
use std::time::Duration;

/// Delete every poison message record older than the retention window.
/// Returns the number of records removed.
pub(super) async fn sweep_expired_poison_records(
    store: &dyn MetadataStore,
    retention: Duration,
) -> StoreResult<u64> {
    let cutoff = chrono::Duration::from_std(retention)
        .ok()
        .and_then(|retention| Utc::now().checked_sub_signed(retention));
    let Some(cutoff) = cutoff else {
        // A retention window too large to represent never expires anything.
        return Ok(0);
    };
    store.delete_poison_records_before(cutoff).await
}
