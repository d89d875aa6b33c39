//! Liveness and readiness endpoints, served by both surfaces.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::AppState;

pub async fn ping() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health(
    State(state): State<AppState>,
) -> Result<Json<Value>, StatusCode> {
    let mut health_status = json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {}
    });

    match state.store.fleet_states().await {
        Ok(fleets) => {
            health_status["checks"]["store"] = json!({
                "status": "healthy",
                "fleets": fleets.len(),
            });
            Ok(Json(health_status))
        }
        Err(err) => {
            health_status["status"] = json!("unhealthy");
            health_status["checks"]["store"] = json!({
                "status": "unhealthy",
                "error": err.to_string(),
            });
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
