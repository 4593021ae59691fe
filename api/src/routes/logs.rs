//! Log query and append endpoints.
//!
//! `GET /api/logs/{priority}` reads live OS logs unless `?source=persisted`
//! is given. `POST /api/logs/{priority}` appends to the persisted partition
//! for that tier. The two never share data.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::models::{AppendLogRequest, LogRecord, PriorityFilter, Tier, UnknownTierError};
use shared::query::LogSource;
use validator::Validate;

/// Query parameters for log retrieval.
#[derive(Debug, Default, Deserialize)]
pub struct LogQueryParams {
    /// Which surface to read (default: live).
    #[serde(default)]
    pub source: LogSource,
}

/// Response for a successful append.
#[derive(Debug, Serialize, Deserialize)]
pub struct AppendLogResponse {
    /// Always "log written".
    pub status: String,
}

/// Creates the log routes.
pub fn logs_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/logs/{priority}", get(query_logs).post(append_log))
        .with_state(state)
}

/// Handler for log retrieval.
///
/// Unknown priorities are a filter that matches nothing, not an error.
async fn query_logs(
    State(state): State<AppState>,
    Path(priority): Path<String>,
    params: Result<Query<LogQueryParams>, QueryRejection>,
) -> Result<Json<Vec<LogRecord>>, ApiError> {
    let Query(params) = params.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    let filter = PriorityFilter::parse(&priority);

    let records = tokio::task::spawn_blocking(move || {
        state.logs().query(&filter, params.source)
    })
    .await??;

    Ok(Json(records))
}

/// Handler for appending to a persisted partition.
async fn append_log(
    State(state): State<AppState>,
    Path(priority): Path<String>,
    payload: Result<Json<AppendLogRequest>, JsonRejection>,
) -> Result<Json<AppendLogResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    let tier: Tier = priority
        .parse()
        .map_err(|e: UnknownTierError| ApiError::Validation(e.to_string()))?;
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    tokio::task::spawn_blocking(move || state.logs().append(tier, &request.message)).await??;
    tracing::debug!(%tier, "Log written");

    Ok(Json(AppendLogResponse {
        status: "log written".to_string(),
    }))
}
