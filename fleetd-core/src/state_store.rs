//! Validated facade over the fleet state/log store.

use std::sync::Arc;

use fleetd_model::{FleetLog, FleetState};
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::persistence::FleetRepository;

/// Keyed upsert/read access to [`FleetState`] and [`FleetLog`] records.
///
/// Payloads are validated once here; the repository below only ever sees
/// well-formed records. Saves replace the stored record wholesale and reads
/// of unknown names fail with [`CoreError::NotFound`]. Store failures
/// propagate to the caller, which may retry with backoff.
pub struct StateStore {
    repo: Arc<dyn FleetRepository>,
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore").finish_non_exhaustive()
    }
}

impl StateStore {
    pub fn new(repo: Arc<dyn FleetRepository>) -> Self {
        Self { repo }
    }

    pub async fn save_fleet_state(&self, state: FleetState) -> Result<()> {
        state.validate()?;
        debug!(fleet = %state.name, robots = state.robots.len(), "saving fleet state");
        self.repo.upsert_fleet_state(&state).await
    }

    pub async fn fleet_state(&self, name: &str) -> Result<FleetState> {
        self.repo
            .get_fleet_state(name)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("fleet {name}")))
    }

    pub async fn fleet_states(&self) -> Result<Vec<FleetState>> {
        self.repo.list_fleet_states().await
    }

    pub async fn save_fleet_log(&self, log: FleetLog) -> Result<()> {
        log.validate()?;
        debug!(fleet = %log.name, entries = log.log.len(), "saving fleet log");
        self.repo.upsert_fleet_log(&log).await
    }

    pub async fn fleet_log(&self, name: &str) -> Result<FleetLog> {
        self.repo
            .get_fleet_log(name)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("fleet log {name}")))
    }

    pub async fn fleet_logs(&self) -> Result<Vec<FleetLog>> {
        self.repo.list_fleet_logs().await
    }
}

#[cfg(test)]
mod tests {
    use fleetd_model::{LogEntry, Tier};

    use super::*;
    use crate::persistence::MemoryRepository;

    fn store() -> StateStore {
        StateStore::new(Arc::new(MemoryRepository::new()))
    }

    #[tokio::test]
    async fn unknown_fleet_is_not_found() {
        let err = store().fleet_state("ghost").await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn malformed_payload_is_a_validation_error() {
        let err = store()
            .save_fleet_state(FleetState::new(""))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn fleet_log_save_replaces_entry_set() {
        let store = store();
        let entry = LogEntry::new(Tier::Info, "charger engaged");
        store
            .save_fleet_log(FleetLog {
                name: "fleet1".to_string(),
                log: vec![entry.clone(), entry.clone()],
            })
            .await
            .unwrap();
        store
            .save_fleet_log(FleetLog {
                name: "fleet1".to_string(),
                log: vec![entry],
            })
            .await
            .unwrap();

        // Replace-on-save: the caller supplies the full entry set.
        assert_eq!(store.fleet_log("fleet1").await.unwrap().log.len(), 1);
    }

    #[tokio::test]
    async fn listing_rereads_current_persisted_state() {
        let store = store();
        for name in ["fleet1", "fleet2"] {
            store
                .save_fleet_log(FleetLog {
                    name: name.to_string(),
                    log: vec![LogEntry::new(Tier::Info, "online")],
                })
                .await
                .unwrap();
        }
        assert_eq!(store.fleet_logs().await.unwrap().len(), 2);

        store
            .save_fleet_log(FleetLog {
                name: "fleet3".to_string(),
                log: vec![],
            })
            .await
            .unwrap();
        assert_eq!(store.fleet_logs().await.unwrap().len(), 3);
    }
}
