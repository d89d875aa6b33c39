//! Gateway-surface ingest endpoints.
//!
//! The fleet-adapter middleware pushes full fleet states, full fleet logs,
//! and task event log fragments here. This is the only writer path into the
//! store in normal operation.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use fleetd_model::{FleetLog, FleetState, TaskEventLog};
use tracing::debug;

use crate::{
    AppState,
    errors::{AppError, AppResult},
};

pub async fn put_fleet_state(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<FleetState>,
) -> AppResult<StatusCode> {
    if body.name != name {
        return Err(AppError::bad_request(format!(
            "fleet name in path ({name}) and body ({}) do not match",
            body.name
        )));
    }

    state.store.save_fleet_state(body).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn put_fleet_log(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<FleetLog>,
) -> AppResult<StatusCode> {
    if body.name != name {
        return Err(AppError::bad_request(format!(
            "fleet name in path ({name}) and body ({}) do not match",
            body.name
        )));
    }

    state.store.save_fleet_log(body).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Merges an incoming task event log fragment: entries append, phases merge
/// shallowly.
pub async fn put_task_log(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(body): Json<TaskEventLog>,
) -> AppResult<StatusCode> {
    if body.task_id != task_id {
        return Err(AppError::bad_request(format!(
            "task id in path ({task_id}) and body ({}) do not match",
            body.task_id
        )));
    }

    let merged = state.task_logs.merge(body).await?;
    debug!(
        task = %task_id,
        entries = merged.log.len(),
        phases = merged.phases.len(),
        "task event log merged"
    );
    Ok(StatusCode::NO_CONTENT)
}
