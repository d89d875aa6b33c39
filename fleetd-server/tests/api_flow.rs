//! Gateway-ingest to public-read flows across both surfaces.

mod support;

use std::collections::HashMap;

use axum::http::StatusCode;
use chrono::Utc;
use fleetd_model::{
    FleetLog, FleetState, Location, LogEntry, RobotMode, RobotState,
    TaskEventLog, Tier,
};
use serde_json::{Value, json};
use tower::ServiceExt;

use support::{get, json_request, read_json, test_apps};

fn fleet1() -> FleetState {
    let mut robots = HashMap::new();
    robots.insert(
        "r1".to_string(),
        RobotState {
            mode: RobotMode::Idle,
            location: Location {
                map: "L1".to_string(),
                x: 0.0,
                y: 0.0,
                yaw: 0.0,
                timestamp: Utc::now(),
            },
        },
    );
    FleetState {
        name: "fleet1".to_string(),
        robots,
    }
}

#[tokio::test]
async fn ingested_fleet_state_is_served_verbatim() {
    let (public, gateway) = test_apps();
    let state = fleet1();

    let response = gateway
        .clone()
        .oneshot(json_request("PUT", "/fleets/fleet1/state", &state))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = public
        .clone()
        .oneshot(get("/api/v1/fleets/fleet1/state"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let served: FleetState = read_json(response).await;
    assert_eq!(served, state);

    let response = public.oneshot(get("/api/v1/fleets")).await.unwrap();
    let listed: Vec<FleetState> = read_json(response).await;
    assert_eq!(listed, vec![state]);
}

#[tokio::test]
async fn second_ingest_replaces_the_robots_mapping() {
    let (public, gateway) = test_apps();

    gateway
        .clone()
        .oneshot(json_request("PUT", "/fleets/fleet1/state", &fleet1()))
        .await
        .unwrap();

    // Empty robots mapping fully replaces the prior one, not merged.
    let empty = FleetState::new("fleet1");
    let response = gateway
        .oneshot(json_request("PUT", "/fleets/fleet1/state", &empty))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = public
        .oneshot(get("/api/v1/fleets/fleet1/state"))
        .await
        .unwrap();
    let served: FleetState = read_json(response).await;
    assert!(served.robots.is_empty());
}

#[tokio::test]
async fn fleet_log_save_is_wholesale_replace() {
    let (public, gateway) = test_apps();

    let two_entries = FleetLog {
        name: "fleet1".to_string(),
        log: vec![
            LogEntry::new(Tier::Info, "r1 docked"),
            LogEntry::new(Tier::Warning, "r2 battery low"),
        ],
    };
    gateway
        .clone()
        .oneshot(json_request("PUT", "/fleets/fleet1/log", &two_entries))
        .await
        .unwrap();

    let one_entry = FleetLog {
        name: "fleet1".to_string(),
        log: vec![LogEntry::new(Tier::Error, "r2 emergency stop")],
    };
    gateway
        .oneshot(json_request("PUT", "/fleets/fleet1/log", &one_entry))
        .await
        .unwrap();

    let response = public
        .oneshot(get("/api/v1/fleets/fleet1/log"))
        .await
        .unwrap();
    let served: FleetLog = read_json(response).await;
    assert_eq!(served.log.len(), 1);
    assert_eq!(served.log[0].tier, Tier::Error);
}

#[tokio::test]
async fn task_log_fragments_merge_across_ingests() {
    let (public, gateway) = test_apps();

    let mut first = TaskEventLog::new("task-1");
    first.log.push(LogEntry::new(Tier::Info, "phase 1 underway"));
    first.merge_phase("1", phase(&[("status", json!("underway"))]));
    gateway
        .clone()
        .oneshot(json_request("PUT", "/tasks/task-1/log", &first))
        .await
        .unwrap();

    let mut second = TaskEventLog::new("task-1");
    second
        .log
        .push(LogEntry::new(Tier::Info, "phase 1 completed"));
    second.merge_phase("1", phase(&[("status", json!("completed"))]));
    second.merge_phase("2", phase(&[("status", json!("queued"))]));
    gateway
        .oneshot(json_request("PUT", "/tasks/task-1/log", &second))
        .await
        .unwrap();

    let response = public
        .oneshot(get("/api/v1/tasks/task-1/log"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let served: TaskEventLog = read_json(response).await;
    assert_eq!(served.log.len(), 2);
    assert_eq!(served.phases["1"]["status"], json!("completed"));
    assert_eq!(served.phases["2"]["status"], json!("queued"));
}

#[tokio::test]
async fn mismatched_path_and_body_names_are_rejected() {
    let (_, gateway) = test_apps();

    let response = gateway
        .oneshot(json_request("PUT", "/fleets/fleet2/state", &fleet1()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_json(response).await;
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("do not match")
    );
}

#[tokio::test]
async fn unknown_records_are_not_found() {
    let (public, _) = test_apps();

    for uri in [
        "/api/v1/fleets/ghost/state",
        "/api/v1/fleets/ghost/log",
        "/api/v1/tasks/ghost/log",
    ] {
        let response = public.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn health_endpoints_respond_on_both_surfaces() {
    let (public, gateway) = test_apps();

    for app in [public, gateway] {
        let response = app.clone().oneshot(get("/ping")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = read_json(response).await;
        assert_eq!(body["checks"]["store"]["status"], json!("healthy"));
    }
}

fn phase(pairs: &[(&str, Value)]) -> serde_json::Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}
