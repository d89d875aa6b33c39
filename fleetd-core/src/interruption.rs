//! Interruption token lifecycle.
//!
//! A task with at least one outstanding token is blocked; resuming the last
//! outstanding token unblocks it. Tokens are opaque, globally unique, and
//! tied to exactly one task. Resume is all-or-nothing across its token set.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use fleetd_model::TaskResumeRequest;
use parking_lot::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::error::{CoreError, Result};

#[derive(Debug, Clone)]
struct TokenRecord {
    task_id: String,
    labels: Vec<String>,
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    tokens: HashMap<String, TokenRecord>,
    by_task: HashMap<String, HashSet<String>>,
}

/// Successful outcome of a resume call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeOutcome {
    /// Tokens discarded by this call.
    pub resumed_tokens: Vec<String>,
    /// Tasks whose outstanding-token set became empty.
    pub unblocked_tasks: Vec<String>,
}

/// Issues, tracks, and resolves interruption tokens.
///
/// Purely in-memory bookkeeping behind one mutex; operations never suspend.
#[derive(Debug, Default)]
pub struct InterruptionTokenRegistry {
    inner: Mutex<RegistryInner>,
}

impl InterruptionTokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an interruption against `task_id` and returns a fresh token.
    /// Multiple tokens may be outstanding for the same task.
    pub fn interrupt(&self, task_id: &str, labels: Vec<String>) -> String {
        let token = Uuid::new_v4().to_string();
        let mut inner = self.inner.lock();
        inner.tokens.insert(
            token.clone(),
            TokenRecord {
                task_id: task_id.to_string(),
                labels,
                created_at: Utc::now(),
            },
        );
        inner
            .by_task
            .entry(task_id.to_string())
            .or_default()
            .insert(token.clone());
        info!(task = task_id, token = %token, "task interrupted");
        token
    }

    /// Resolves and discards the token set named by `request`.
    ///
    /// `for_tokens` names the exact set; otherwise `for_task` resolves to all
    /// tokens currently outstanding for that task at call time. Any unknown
    /// token aborts the whole call with [`CoreError::UnknownToken`] and no
    /// token is consumed.
    pub fn resume(&self, request: &TaskResumeRequest) -> Result<ResumeOutcome> {
        let mut inner = self.inner.lock();

        let targets: Vec<String> = match (&request.for_tokens, &request.for_task)
        {
            (Some(tokens), _) => {
                if tokens.is_empty() {
                    return Err(CoreError::InvalidRequest(
                        "for_tokens must not be empty".to_string(),
                    ));
                }
                let mut seen = HashSet::new();
                tokens
                    .iter()
                    .filter(|t| seen.insert(t.as_str()))
                    .cloned()
                    .collect()
            }
            (None, Some(task_id)) => inner
                .by_task
                .get(task_id)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default(),
            (None, None) => {
                return Err(CoreError::InvalidRequest(
                    "one of for_task or for_tokens is required".to_string(),
                ));
            }
        };

        // All-or-nothing: verify the whole set before consuming anything.
        for token in &targets {
            if !inner.tokens.contains_key(token) {
                return Err(CoreError::UnknownToken(token.clone()));
            }
        }

        let mut unblocked = Vec::new();
        for token in &targets {
            let Some(record) = inner.tokens.remove(token) else {
                continue;
            };
            if let Some(set) = inner.by_task.get_mut(&record.task_id) {
                set.remove(token);
                if set.is_empty() {
                    inner.by_task.remove(&record.task_id);
                    unblocked.push(record.task_id.clone());
                }
            }
        }
        unblocked.sort();
        unblocked.dedup();

        info!(
            resumed = targets.len(),
            unblocked = unblocked.len(),
            "interruptions resumed"
        );
        Ok(ResumeOutcome {
            resumed_tokens: targets,
            unblocked_tasks: unblocked,
        })
    }

    /// Tokens currently outstanding for `task_id`.
    pub fn outstanding_tokens(&self, task_id: &str) -> Vec<String> {
        self.inner
            .lock()
            .by_task
            .get(task_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// A task is blocked while it has at least one outstanding token.
    pub fn is_blocked(&self, task_id: &str) -> bool {
        self.inner.lock().by_task.contains_key(task_id)
    }

    /// Labels recorded with an outstanding token, if it exists.
    pub fn token_labels(&self, token: &str) -> Option<Vec<String>> {
        self.inner
            .lock()
            .tokens
            .get(token)
            .map(|record| record.labels.clone())
    }
}
