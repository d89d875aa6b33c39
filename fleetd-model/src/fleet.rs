//! Live state of a named fleet and the robots it manages.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Operating mode reported by a robot's fleet adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RobotMode {
    Idle,
    Charging,
    Moving,
    Paused,
    Waiting,
    Emergency,
    GoingHome,
    Docking,
    AdapterError,
    Cleaning,
}

/// Position of a robot on a named map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub map: String,
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotState {
    pub mode: RobotMode,
    pub location: Location,
}

/// Snapshot of a fleet, keyed by its immutable name.
///
/// An upsert replaces the entire robots mapping. There is no per-robot
/// merge: the fleet adapter always reports the full fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetState {
    pub name: String,
    #[serde(default)]
    pub robots: HashMap<String, RobotState>,
}

impl FleetState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            robots: HashMap::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ModelError::InvalidPayload(
                "fleet name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn robot_mode_uses_wire_names() {
        let json = serde_json::to_string(&RobotMode::GoingHome).unwrap();
        assert_eq!(json, "\"GOING_HOME\"");
        let mode: RobotMode = serde_json::from_str("\"ADAPTER_ERROR\"").unwrap();
        assert_eq!(mode, RobotMode::AdapterError);
    }

    #[test]
    fn fleet_state_robots_default_to_empty() {
        let state: FleetState =
            serde_json::from_str(r#"{"name":"fleet1"}"#).unwrap();
        assert!(state.robots.is_empty());
        assert!(state.validate().is_ok());
    }

    #[test]
    fn blank_fleet_name_is_rejected() {
        let state = FleetState::new("  ");
        assert!(state.validate().is_err());
    }
}
