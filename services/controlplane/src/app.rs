//! Control-plane HTTP application wiring.
//!
//! # Purpose
//! Defines the shared state handlers receive and assembles the Axum router
//! with tracing middleware over it.
//!
//! # Notes
//! Route composition lives here rather than in `main` so tests can build the
//! full router around in-memory collaborators.
use crate::api;
use crate::api::openapi::ApiDoc;
use crate::dashboard::OverviewSnapshot;
use crate::observability;
use crate::store::MetadataStore;
use crate::transport::Transport;
use axum::Router;
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use utoipa::OpenApi;

#[derive(Clone)]
pub struct AppState {
    pub api_version: String,
    pub store: Arc<dyn MetadataStore + Send + Sync>,
    pub transport: Arc<dyn Transport + Send + Sync>,
    pub overview: watch::Receiver<OverviewSnapshot>,
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            let parent = observability::trace_context_from_headers(request.headers());
            let span = tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            );
            span.set_parent(parent);
            span
        });

    Router::new()
        .route(
            "/v1/system/info",
            axum::routing::get(api::system::system_info),
        )
        .route(
            "/v1/system/health",
            axum::routing::get(api::system::system_health),
        )
        .route(
            "/v1/overview",
            axum::routing::get(api::overview::get_overview),
        )
        .route(
            "/v1/stations",
            axum::routing::get(api::stations::list_stations).post(api::stations::create_station),
        )
        .route(
            "/v1/stations/:name",
            axum::routing::get(api::stations::get_station)
                .delete(api::stations::delete_station),
        )
        .route(
            "/v1/users",
            axum::routing::get(api::users::list_users).post(api::users::create_user),
        )
        .route(
            "/v1/users/:username",
            axum::routing::delete(api::users::delete_user),
        )
        .route(
            "/v1/openapi.json",
            axum::routing::get(|| async { axum::Json(ApiDoc::openapi()) }),
        )
        .layer(trace_layer)
        .with_state(state)
}
