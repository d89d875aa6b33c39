//! In-memory repository backend.
//!
//! Default backend when no database is configured, and the backend the test
//! suites run against. DashMap gives per-key serialization: an insert
//! publishes a complete record or nothing.

use async_trait::async_trait;
use dashmap::DashMap;
use fleetd_model::{FleetLog, FleetState, TaskEventLog};

use super::FleetRepository;
use crate::error::Result;

#[derive(Debug, Default)]
pub struct MemoryRepository {
    fleet_states: DashMap<String, FleetState>,
    fleet_logs: DashMap<String, FleetLog>,
    task_logs: DashMap<String, TaskEventLog>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FleetRepository for MemoryRepository {
    async fn upsert_fleet_state(&self, state: &FleetState) -> Result<()> {
        self.fleet_states
            .insert(state.name.clone(), state.clone());
        Ok(())
    }

    async fn get_fleet_state(&self, name: &str) -> Result<Option<FleetState>> {
        Ok(self.fleet_states.get(name).map(|r| r.value().clone()))
    }

    async fn list_fleet_states(&self) -> Result<Vec<FleetState>> {
        Ok(self
            .fleet_states
            .iter()
            .map(|r| r.value().clone())
            .collect())
    }

    async fn upsert_fleet_log(&self, log: &FleetLog) -> Result<()> {
        self.fleet_logs.insert(log.name.clone(), log.clone());
        Ok(())
    }

    async fn get_fleet_log(&self, name: &str) -> Result<Option<FleetLog>> {
        Ok(self.fleet_logs.get(name).map(|r| r.value().clone()))
    }

    async fn list_fleet_logs(&self) -> Result<Vec<FleetLog>> {
        Ok(self.fleet_logs.iter().map(|r| r.value().clone()).collect())
    }

    async fn upsert_task_log(&self, log: &TaskEventLog) -> Result<()> {
        self.task_logs.insert(log.task_id.clone(), log.clone());
        Ok(())
    }

    async fn get_task_log(&self, task_id: &str) -> Result<Option<TaskEventLog>> {
        Ok(self.task_logs.get(task_id).map(|r| r.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use chrono::Utc;
    use fleetd_model::{Location, RobotMode, RobotState};

    use super::*;

    fn robot(mode: RobotMode) -> RobotState {
        RobotState {
            mode,
            location: Location {
                map: "L1".to_string(),
                x: 0.0,
                y: 0.0,
                yaw: 0.0,
                timestamp: Utc::now(),
            },
        }
    }

    fn fleet(name: &str, robots: &[(&str, RobotMode)]) -> FleetState {
        FleetState {
            name: name.to_string(),
            robots: robots
                .iter()
                .map(|(id, mode)| (id.to_string(), robot(*mode)))
                .collect(),
        }
    }

    #[tokio::test]
    async fn repeated_upsert_is_idempotent() {
        let repo = MemoryRepository::new();
        let state = fleet("fleet1", &[("r1", RobotMode::Idle)]);

        for _ in 0..3 {
            repo.upsert_fleet_state(&state).await.unwrap();
        }

        let stored = repo.get_fleet_state("fleet1").await.unwrap().unwrap();
        assert_eq!(stored, state);
        assert_eq!(repo.list_fleet_states().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upsert_replaces_robots_wholesale() {
        let repo = MemoryRepository::new();
        repo.upsert_fleet_state(&fleet("fleet1", &[("r1", RobotMode::Idle)]))
            .await
            .unwrap();
        repo.upsert_fleet_state(&FleetState {
            name: "fleet1".to_string(),
            robots: HashMap::new(),
        })
        .await
        .unwrap();

        let stored = repo.get_fleet_state("fleet1").await.unwrap().unwrap();
        assert!(stored.robots.is_empty());
    }

    #[tokio::test]
    async fn missing_records_read_as_none() {
        let repo = MemoryRepository::new();
        assert!(repo.get_fleet_state("nope").await.unwrap().is_none());
        assert!(repo.get_fleet_log("nope").await.unwrap().is_none());
        assert!(repo.get_task_log("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_same_key_upserts_leave_one_complete_payload() {
        let repo = Arc::new(MemoryRepository::new());

        let writers: Vec<_> = (0..16)
            .map(|i| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move {
                    let state =
                        fleet("fleet1", &[(&format!("r{i}"), RobotMode::Moving)]);
                    repo.upsert_fleet_state(&state).await.unwrap();
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap();
        }

        // Exactly one of the sixteen payloads won, never a mix.
        let stored = repo.get_fleet_state("fleet1").await.unwrap().unwrap();
        assert_eq!(stored.robots.len(), 1);
        let id = stored.robots.keys().next().unwrap();
        assert!(id.starts_with('r'));
    }
}
