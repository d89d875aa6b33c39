//! Fleet-level and task-level event logs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ModelError, Result};

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub tier: Tier,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl LogEntry {
    pub fn new(tier: Tier, text: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            tier,
            text: text.into(),
            task_id: None,
        }
    }
}

/// Accumulated log of a fleet, keyed by the fleet name.
///
/// Persistence replaces the stored blob wholesale on each save; the writer
/// supplies the full desired entry set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetLog {
    pub name: String,
    #[serde(default)]
    pub log: Vec<LogEntry>,
}

impl FleetLog {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ModelError::InvalidPayload(
                "fleet name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Append-structured log of one task, with per-phase structured records.
///
/// Created on the first event for a task id and retained for audit; it is
/// never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEventLog {
    pub task_id: String,
    #[serde(default)]
    pub log: Vec<LogEntry>,
    #[serde(default)]
    pub phases: HashMap<String, Map<String, Value>>,
}

impl TaskEventLog {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            log: Vec::new(),
            phases: HashMap::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.task_id.trim().is_empty() {
            return Err(ModelError::InvalidPayload(
                "task id must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Shallow-merges `patch` into the record of `phase_id`, creating the
    /// phase if absent. Last writer wins per key.
    pub fn merge_phase(&mut self, phase_id: &str, patch: Map<String, Value>) {
        let phase = self.phases.entry(phase_id.to_string()).or_default();
        for (key, value) in patch {
            phase.insert(key, value);
        }
    }
}
