#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use fleetd_core::{
    FleetRepository, InterruptionTokenRegistry, MemoryRepository, StateStore,
    TaskEventLogService,
};
use fleetd_server::infra::config::Config;
use fleetd_server::{AppState, create_gateway_app, create_public_app};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub fn test_state() -> AppState {
    let repo: Arc<dyn FleetRepository> = Arc::new(MemoryRepository::new());
    let mut config = Config::default();
    config.dev_mode = true;

    AppState::new(
        Arc::new(StateStore::new(Arc::clone(&repo))),
        Arc::new(TaskEventLogService::new(repo)),
        Arc::new(InterruptionTokenRegistry::new()),
        Arc::new(config),
    )
}

/// Public and gateway apps sharing one state, as in the real process.
pub fn test_apps() -> (Router, Router) {
    let state = test_state();
    (create_public_app(state.clone()), create_gateway_app(state))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request<T: Serialize>(
    method: &str,
    uri: &str,
    body: &T,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
