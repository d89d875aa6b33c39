use axum::{Router, routing::put};

use crate::{AppState, handlers::gateway};

/// Create the gateway ingest routes. Unversioned: the gateway surface is
/// internal and lifecycled together with the middleware that calls it.
pub fn create_gateway_router() -> Router<AppState> {
    Router::new()
        .route("/fleets/{name}/state", put(gateway::put_fleet_state))
        .route("/fleets/{name}/log", put(gateway::put_fleet_log))
        .route("/tasks/{task_id}/log", put(gateway::put_task_log))
}
