use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    AppState,
    handlers::{fleets, tasks},
};

/// Create all v1 public API routes.
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        // Fleet queries
        .route("/fleets", get(fleets::list_fleets))
        .route("/fleets/{name}/state", get(fleets::get_fleet_state))
        .route("/fleets/{name}/log", get(fleets::get_fleet_log))
        // Task queries
        .route("/tasks/{task_id}/log", get(tasks::get_task_log))
        // Interruption protocol
        .route("/tasks/interrupt_task", post(tasks::interrupt_task))
        .route("/tasks/resume_task", post(tasks::resume_task))
}
