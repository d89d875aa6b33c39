//! Per-task event log bookkeeping.

use std::sync::Arc;

use dashmap::DashMap;
use fleetd_model::{LogEntry, TaskEventLog};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::persistence::FleetRepository;

/// Append-and-merge service over the stored [`TaskEventLog`] records.
///
/// The repository only supports wholesale replace, so every mutation here is
/// a read-modify-write. A per-task async lock linearizes mutations on the
/// same task id; tasks never contend with each other. Records are created on
/// the first event and never deleted.
pub struct TaskEventLogService {
    repo: Arc<dyn FleetRepository>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for TaskEventLogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskEventLogService").finish_non_exhaustive()
    }
}

impl TaskEventLogService {
    pub fn new(repo: Arc<dyn FleetRepository>) -> Self {
        Self {
            repo,
            locks: DashMap::new(),
        }
    }

    fn lock_for(&self, task_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(task_id.to_string())
            .or_default()
            .clone()
    }

    /// Appends `entry` to the task-level log, creating the record if absent.
    /// When `phase_id` is given, `phase_patch` is shallow-merged into that
    /// phase's structured record.
    pub async fn record_event(
        &self,
        task_id: &str,
        entry: LogEntry,
        phase_id: Option<&str>,
        phase_patch: Option<Map<String, Value>>,
    ) -> Result<TaskEventLog> {
        if task_id.trim().is_empty() {
            return Err(CoreError::Validation(
                "task id must not be empty".to_string(),
            ));
        }

        let lock = self.lock_for(task_id);
        let _guard = lock.lock().await;

        let mut record = self
            .repo
            .get_task_log(task_id)
            .await?
            .unwrap_or_else(|| TaskEventLog::new(task_id));
        record.log.push(entry);
        if let Some(phase_id) = phase_id {
            record.merge_phase(phase_id, phase_patch.unwrap_or_default());
        }

        self.repo.upsert_task_log(&record).await?;
        debug!(task = task_id, entries = record.log.len(), "task event recorded");
        Ok(record)
    }

    /// Merges a full incoming log (the gateway ingest shape): appends all
    /// entries and shallow-merges every phase into the stored record.
    pub async fn merge(&self, incoming: TaskEventLog) -> Result<TaskEventLog> {
        incoming.validate()?;

        let lock = self.lock_for(&incoming.task_id);
        let _guard = lock.lock().await;

        let mut record = self
            .repo
            .get_task_log(&incoming.task_id)
            .await?
            .unwrap_or_else(|| TaskEventLog::new(&incoming.task_id));
        record.log.extend(incoming.log);
        for (phase_id, patch) in incoming.phases {
            record.merge_phase(&phase_id, patch);
        }

        self.repo.upsert_task_log(&record).await?;
        Ok(record)
    }

    pub async fn get(&self, task_id: &str) -> Result<TaskEventLog> {
        self.repo
            .get_task_log(task_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("task log {task_id}")))
    }
}

#[cfg(test)]
mod tests {
    use fleetd_model::Tier;
    use serde_json::json;

    use super::*;
    use crate::persistence::MemoryRepository;

    fn service() -> TaskEventLogService {
        TaskEventLogService::new(Arc::new(MemoryRepository::new()))
    }

    fn entry(text: &str) -> LogEntry {
        LogEntry::new(Tier::Info, text)
    }

    fn patch(key: &str, value: Value) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(key.to_string(), value);
        map
    }

    #[tokio::test]
    async fn first_event_creates_the_record() {
        let service = service();
        let record = service
            .record_event("task-1", entry("started"), None, None)
            .await
            .unwrap();
        assert_eq!(record.task_id, "task-1");
        assert_eq!(record.log.len(), 1);
        assert_eq!(service.get("task-1").await.unwrap(), record);
    }

    #[tokio::test]
    async fn events_accumulate_and_phases_merge_shallowly() {
        let service = service();
        service
            .record_event(
                "task-1",
                entry("phase 1 underway"),
                Some("1"),
                Some(patch("status", json!("underway"))),
            )
            .await
            .unwrap();
        let record = service
            .record_event(
                "task-1",
                entry("phase 1 completed"),
                Some("1"),
                Some(patch("status", json!("completed"))),
            )
            .await
            .unwrap();

        assert_eq!(record.log.len(), 2);
        assert_eq!(record.phases["1"]["status"], json!("completed"));
    }

    #[tokio::test]
    async fn merge_appends_entries_and_merges_all_phases() {
        let service = service();
        service
            .record_event("task-1", entry("started"), Some("1"), None)
            .await
            .unwrap();

        let mut incoming = TaskEventLog::new("task-1");
        incoming.log.push(entry("phase 2 queued"));
        incoming.merge_phase("2", patch("status", json!("queued")));
        let record = service.merge(incoming).await.unwrap();

        assert_eq!(record.log.len(), 2);
        assert!(record.phases.contains_key("1"));
        assert_eq!(record.phases["2"]["status"], json!("queued"));
    }

    #[tokio::test]
    async fn unknown_task_is_not_found() {
        let err = service().get("ghost").await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn empty_task_id_is_rejected() {
        let err = service()
            .record_event("", entry("nope"), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn concurrent_events_on_one_task_all_land() {
        let service = Arc::new(service());
        let writers: Vec<_> = (0..16)
            .map(|i| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    service
                        .record_event("task-1", entry(&format!("event {i}")), None, None)
                        .await
                        .unwrap();
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap();
        }

        assert_eq!(service.get("task-1").await.unwrap().log.len(), 16);
    }
}
