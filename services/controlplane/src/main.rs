//! Juno control-plane HTTP service entry point.
//!
//! # Purpose
//! Wires configuration, storage, the in-process transport, and the background
//! reaper and overview tasks, then starts the main API server.
//!
//! # Notes
//! Background tasks hang off one cancellation token so a single cancel stops
//! the reaper mid-tick and the overview refresher before the process exits.
mod api;
mod app;
mod config;
mod dashboard;
mod model;
mod observability;
mod reaper;
mod store;
mod transport;
mod users;

use app::{AppState, build_router};
use juno_engine::Engine;
use juno_engine::liveness::{ConnectionRegistry, spawn_responder};
use reaper::Reaper;
use std::future::Future;
use std::sync::Arc;
use store::{MetadataStore, memory::InMemoryStore};
use tokio_util::sync::CancellationToken;
use transport::Transport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::ControlPlaneConfig::from_env_or_yaml().expect("control plane config");
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: config::ControlPlaneConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability("juno-controlplane");
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));

    let store: Arc<dyn MetadataStore + Send + Sync> = Arc::new(InMemoryStore::new());
    let engine = Arc::new(Engine::new());
    let transport: Arc<dyn Transport + Send + Sync> = engine.clone();

    let cancel = CancellationToken::new();
    // Every engine host answers probes for the connections it registers.
    // This process registers none itself; a session layer embedding the
    // engine fills the registry.
    let registry = Arc::new(ConnectionRegistry::new());
    let responder_task = spawn_responder(engine, registry, cancel.child_token());
    let (overview, overview_task) = dashboard::spawn_refresher(
        store.clone(),
        config.overview_refresh,
        cancel.child_token(),
    );
    let reaper = Reaper::new(store.clone(), transport.clone(), config.reaper.clone());
    let reaper_task = tokio::spawn(reaper.run(cancel.child_token()));

    let state = AppState {
        api_version: "v1".to_string(),
        store,
        transport,
        overview,
    };
    let app = build_router(state);

    let addr = config.bind_addr;
    tracing::info!(%addr, "control plane listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }

    cancel.cancel();
    let _ = reaper_task.await;
    let _ = overview_task.await;
    let _ = responder_task.await;
    metrics_task.abort();
    let _ = metrics_task.await;
    Ok(())
}
