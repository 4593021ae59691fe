//! Host metrics endpoint.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use shared::models::MetricsSnapshot;

/// Creates the metrics routes.
pub fn metrics_routes(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(get_metrics))
        .with_state(state)
}

/// Samples the host. The CPU window blocks, so sampling runs on the
/// blocking pool and no lock is held meanwhile.
pub(crate) async fn sample(state: &AppState) -> Result<MetricsSnapshot, ApiError> {
    let provider = state.snapshots();
    tokio::task::spawn_blocking(move || provider.snapshot())
        .await
        .map_err(ApiError::from)
}

async fn get_metrics(State(state): State<AppState>) -> Result<Json<MetricsSnapshot>, ApiError> {
    Ok(Json(sample(&state).await?))
}
