//! Public-surface task queries and the interruption/resume protocol.

use axum::{
    Json,
    extract::{Path, State},
};
use fleetd_model::{
    TaskEventLog, TaskInterruptRequest, TaskInterruptionResponse,
    TaskResumeRequest, TaskResumeResponse,
};
use tracing::info;

use crate::{
    AppState,
    errors::{AppError, AppResult},
};

pub async fn get_task_log(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> AppResult<Json<TaskEventLog>> {
    let log = state.task_logs.get(&task_id).await?;
    Ok(Json(log))
}

/// Interrupts a task, returning the token that a later resume must present.
/// Whether the task is in a state that permits interruption is enforced by
/// the task-state collaborator upstream; this endpoint always issues a token.
pub async fn interrupt_task(
    State(state): State<AppState>,
    Json(request): Json<TaskInterruptRequest>,
) -> AppResult<Json<TaskInterruptionResponse>> {
    if request.task_id.trim().is_empty() {
        return Err(AppError::bad_request("task_id must not be empty"));
    }

    let token = state
        .interruptions
        .interrupt(&request.task_id, request.labels.unwrap_or_default());
    Ok(Json(TaskInterruptionResponse { token }))
}

/// Resumes interruptions by token set or by task. All-or-nothing: an unknown
/// token fails the whole call and consumes nothing.
pub async fn resume_task(
    State(state): State<AppState>,
    Json(request): Json<TaskResumeRequest>,
) -> AppResult<Json<TaskResumeResponse>> {
    let outcome = state.interruptions.resume(&request)?;
    if !outcome.unblocked_tasks.is_empty() {
        info!(tasks = ?outcome.unblocked_tasks, "tasks unblocked");
    }
    Ok(Json(TaskResumeResponse {
        unblocked_tasks: outcome.unblocked_tasks,
    }))
}
