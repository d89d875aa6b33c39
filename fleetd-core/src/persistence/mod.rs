//! Persistence port and backends.
//!
//! The store is a keyed upsert/read store of full records: saving a fleet
//! state or fleet log replaces the stored blob wholesale. Incremental merge
//! happens above this layer, never inside it.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use fleetd_model::{FleetLog, FleetState, TaskEventLog};

use crate::error::Result;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

/// Persistence seam for the three entity kinds.
///
/// Implementations must serialize concurrent upserts to the same key so that
/// readers never observe a partially-written record; upserts to different
/// keys proceed independently. Listing re-reads the current persisted state
/// rather than a snapshot.
#[async_trait]
pub trait FleetRepository: Send + Sync {
    async fn upsert_fleet_state(&self, state: &FleetState) -> Result<()>;
    async fn get_fleet_state(&self, name: &str) -> Result<Option<FleetState>>;
    async fn list_fleet_states(&self) -> Result<Vec<FleetState>>;

    async fn upsert_fleet_log(&self, log: &FleetLog) -> Result<()>;
    async fn get_fleet_log(&self, name: &str) -> Result<Option<FleetLog>>;
    async fn list_fleet_logs(&self) -> Result<Vec<FleetLog>>;

    async fn upsert_task_log(&self, log: &TaskEventLog) -> Result<()>;
    async fn get_task_log(&self, task_id: &str) -> Result<Option<TaskEventLog>>;
}
