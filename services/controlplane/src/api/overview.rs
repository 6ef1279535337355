//! Dashboard overview handler.
use crate::dashboard::OverviewSnapshot;
use crate::app::AppState;
use axum::Json;
use axum::extract::State;

#[utoipa::path(
    get,
    path = "/v1/overview",
    tag = "overview",
    responses(
        (status = 200, description = "Latest aggregated overview", body = OverviewSnapshot)
    )
)]
/// Return the most recent overview snapshot.
///
/// # What it does
/// Serves the snapshot the background refresher last published; the handler
/// itself never touches the store.
pub(crate) async fn get_overview(State(state): State<AppState>) -> Json<OverviewSnapshot> {
    Json(state.overview.borrow().clone())
}
