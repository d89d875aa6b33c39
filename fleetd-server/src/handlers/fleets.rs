//! Public-surface fleet queries.

use axum::{
    Json,
    extract::{Path, State},
};
use fleetd_model::{FleetLog, FleetState};

use crate::{AppState, errors::AppResult};

pub async fn list_fleets(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<FleetState>>> {
    let fleets = state.store.fleet_states().await?;
    Ok(Json(fleets))
}

pub async fn get_fleet_state(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<FleetState>> {
    let fleet = state.store.fleet_state(&name).await?;
    Ok(Json(fleet))
}

pub async fn get_fleet_log(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<FleetLog>> {
    let log = state.store.fleet_log(&name).await?;
    Ok(Json(log))
}
