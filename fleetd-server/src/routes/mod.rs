pub mod gateway;
pub mod v1;

use crate::AppState;
use axum::Router;

/// Create the main public API router with all versions.
pub fn create_api_router() -> Router<AppState> {
    Router::new().nest("/api/v1", v1::create_v1_router())
}

/// Create the gateway ingest router used by the fleet-adapter middleware.
pub fn create_gateway_router() -> Router<AppState> {
    gateway::create_gateway_router()
}
