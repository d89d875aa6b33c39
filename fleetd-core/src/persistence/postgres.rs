//! PostgreSQL repository backend.
//!
//! Each entity kind lives in its own table as a single JSONB blob keyed by
//! name (or task id). Saving goes through `INSERT .. ON CONFLICT .. DO
//! UPDATE`, preserving the replace-on-save contract: the row always holds one
//! complete payload. Row-level locking in Postgres serializes concurrent
//! upserts to the same key.

use async_trait::async_trait;
use fleetd_model::{FleetLog, FleetState, TaskEventLog};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::FleetRepository;
use crate::error::{CoreError, Result};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS fleet_states (
        name TEXT PRIMARY KEY,
        data JSONB NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS fleet_logs (
        name TEXT PRIMARY KEY,
        data JSONB NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS task_event_logs (
        task_id TEXT PRIMARY KEY,
        data JSONB NOT NULL
    )",
];

#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .connect(url)
            .await
            .map_err(unavailable)?;
        Ok(Self { pool })
    }

    /// Creates the blob tables if they do not exist yet. Safe to run on
    /// every startup.
    pub async fn initialize_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(unavailable)?;
        }
        Ok(())
    }

    async fn upsert_blob<T: Serialize>(
        &self,
        query: &'static str,
        key: &str,
        record: &T,
    ) -> Result<()> {
        let data = serde_json::to_value(record)?;
        sqlx::query(query)
            .bind(key)
            .bind(data)
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn get_blob<T: DeserializeOwned>(
        &self,
        query: &'static str,
        key: &str,
    ) -> Result<Option<T>> {
        let row: Option<serde_json::Value> = sqlx::query_scalar(query)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        row.map(serde_json::from_value)
            .transpose()
            .map_err(CoreError::from)
    }

    async fn list_blobs<T: DeserializeOwned>(
        &self,
        query: &'static str,
    ) -> Result<Vec<T>> {
        let rows: Vec<serde_json::Value> = sqlx::query_scalar(query)
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(CoreError::from))
            .collect()
    }
}

#[async_trait]
impl FleetRepository for PostgresRepository {
    async fn upsert_fleet_state(&self, state: &FleetState) -> Result<()> {
        self.upsert_blob(
            "INSERT INTO fleet_states (name, data) VALUES ($1, $2)
             ON CONFLICT (name) DO UPDATE SET data = EXCLUDED.data",
            &state.name,
            state,
        )
        .await
    }

    async fn get_fleet_state(&self, name: &str) -> Result<Option<FleetState>> {
        self.get_blob("SELECT data FROM fleet_states WHERE name = $1", name)
            .await
    }

    async fn list_fleet_states(&self) -> Result<Vec<FleetState>> {
        self.list_blobs("SELECT data FROM fleet_states ORDER BY name")
            .await
    }

    async fn upsert_fleet_log(&self, log: &FleetLog) -> Result<()> {
        self.upsert_blob(
            "INSERT INTO fleet_logs (name, data) VALUES ($1, $2)
             ON CONFLICT (name) DO UPDATE SET data = EXCLUDED.data",
            &log.name,
            log,
        )
        .await
    }

    async fn get_fleet_log(&self, name: &str) -> Result<Option<FleetLog>> {
        self.get_blob("SELECT data FROM fleet_logs WHERE name = $1", name)
            .await
    }

    async fn list_fleet_logs(&self) -> Result<Vec<FleetLog>> {
        self.list_blobs("SELECT data FROM fleet_logs ORDER BY name")
            .await
    }

    async fn upsert_task_log(&self, log: &TaskEventLog) -> Result<()> {
        self.upsert_blob(
            "INSERT INTO task_event_logs (task_id, data) VALUES ($1, $2)
             ON CONFLICT (task_id) DO UPDATE SET data = EXCLUDED.data",
            &log.task_id,
            log,
        )
        .await
    }

    async fn get_task_log(&self, task_id: &str) -> Result<Option<TaskEventLog>> {
        self.get_blob(
            "SELECT data FROM task_event_logs WHERE task_id = $1",
            task_id,
        )
        .await
    }
}

fn unavailable(err: sqlx::Error) -> CoreError {
    CoreError::Unavailable(err.to_string())
}
