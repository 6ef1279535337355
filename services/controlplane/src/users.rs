//! User removal cascade.
//!
//! # Purpose
//! When a user is removed, their station attribution is rewritten with a
//! suffix marker instead of being erased, so dashboards keep a resolvable
//! owner name. Application users additionally lose every connection their
//! credentials hold, with the same resource cascade the reaper applies to
//! zombie connections. This runs synchronously inside the removal request,
//! not on the reaper tick.
use crate::model::{User, UserType};
use crate::reaper::{CascadeOutcome, cascade};
use crate::store::{MetadataStore, StoreResult};

pub const DELETED_USER_SUFFIX: &str = "(deleted)";

#[derive(Debug, Default, Clone, Copy)]
pub struct DetachOutcome {
    pub stations_reattributed: u64,
    pub resources: CascadeOutcome,
}

/// Detach everything the user owns ahead of deleting the user record.
pub async fn detach_user_resources(
    store: &dyn MetadataStore,
    user: &User,
) -> StoreResult<DetachOutcome> {
    let mut outcome = DetachOutcome::default();
    let replacement = format!("{}{}", user.username, DELETED_USER_SUFFIX);
    outcome.stations_reattributed = store
        .reattribute_stations(&user.username, &replacement)
        .await?;

    // Human operators keep their sessions; service identities lose theirs.
    if user.user_type == UserType::Application {
        let connections = store
            .list_active_connections_by_user(&user.username)
            .await?;
        let ids: Vec<_> = connections.iter().map(|c| c.id).collect();
        outcome.resources = cascade::deactivate_connection_resources(store, &ids).await;
    }
    Ok(outcome)
}
