//! Liveness prober.
//!
//! # Purpose
//! Confirms which metadata-active connections still exist anywhere on the
//! transport. Each probe broadcasts the connection id on the shared status
//! subject and waits on a per-probe reply subject; the hosting node answers,
//! everyone else stays silent. No reply within the timeout is the only signal
//! that the connection is gone.
use crate::store::{MetadataStore, StoreResult};
use crate::transport::Transport;
use bytes::Bytes;
use juno_common::ids::ConnectionId;
use juno_common::probe::{CONNECTION_STATUS_SUBJECT, reply_subject};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

enum ProbeOutcome {
    Alive,
    Silent,
    Skipped,
}

/// Probe every active connection sequentially and return the silent ones.
///
/// Probes run one at a time so only one reply subscription is ever open.
/// Transport failures skip the affected connection for this pass; only
/// confirmed silence lands a connection in the returned batch.
pub(super) async fn collect_zombies(
    store: &dyn MetadataStore,
    transport: &dyn Transport,
    probe_timeout: Duration,
    cancel: &CancellationToken,
) -> StoreResult<Vec<ConnectionId>> {
    let connections = store.list_active_connections().await?;
    let mut zombies = Vec::new();
    for connection in connections {
        if cancel.is_cancelled() {
            break;
        }
        match probe_connection(transport, &connection.id, probe_timeout, cancel).await {
            ProbeOutcome::Silent => zombies.push(connection.id),
            ProbeOutcome::Alive | ProbeOutcome::Skipped => {}
        }
    }
    Ok(zombies)
}

async fn probe_connection(
    transport: &dyn Transport,
    id: &ConnectionId,
    probe_timeout: Duration,
    cancel: &CancellationToken,
) -> ProbeOutcome {
    let reply = reply_subject(CONNECTION_STATUS_SUBJECT);

    // Subscribe before publishing so a fast reply cannot slip past us.
    let mut subscription = match transport.subscribe(&reply).await {
        Ok(subscription) => subscription,
        Err(err) => {
            tracing::warn!(connection_id = %id, error = %err, "probe subscribe failed, skipping");
            return ProbeOutcome::Skipped;
        }
    };

    if let Err(err) = transport
        .publish_request(CONNECTION_STATUS_SUBJECT, &reply, Bytes::from(id.to_string()))
        .await
    {
        tracing::warn!(connection_id = %id, error = %err, "probe publish failed, skipping");
        return ProbeOutcome::Skipped;
    }

    // The subscription drops at the end of this function, which unsubscribes
    // from the reply subject whatever the outcome.
    tokio::select! {
        _ = cancel.cancelled() => ProbeOutcome::Skipped,
        outcome = tokio::time::timeout(probe_timeout, subscription.recv()) => match outcome {
            // Reply content is ignored; any reply means some node owns the id.
            Ok(Some(_)) => ProbeOutcome::Alive,
            Ok(None) => {
                tracing::warn!(connection_id = %id, "probe reply channel closed, skipping");
                ProbeOutcome::Skipped
            }
            Err(_) => ProbeOutcome::Silent,
        },
    }
}
