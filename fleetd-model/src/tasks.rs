//! Request/response envelopes of the task interruption protocol.

use serde::{Deserialize, Serialize};

/// Body of a public-surface interruption request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInterruptRequest {
    /// Indicates that this is a task interruption request.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    pub task_id: String,
    /// Labels describing this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

/// Response to a request for a task to be interrupted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInterruptionResponse {
    /// Opaque token correlating this interruption to a later resume.
    pub token: String,
}

/// Body of a public-surface resume request.
///
/// At least one of `for_task` / `for_tokens` must be present, and
/// `for_tokens`, when present, must be non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResumeRequest {
    /// Indicates that this is a task resuming request.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    /// Task ID whose outstanding interruptions should all be resumed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_task: Option<String>,
    /// Tokens of interruption requests which should be resumed. The
    /// interruption request associated with each token is discarded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_tokens: Option<Vec<String>>,
    /// Labels describing this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl TaskResumeRequest {
    pub fn for_tokens(tokens: Vec<String>) -> Self {
        Self {
            for_tokens: Some(tokens),
            ..Self::default()
        }
    }

    pub fn for_task(task_id: impl Into<String>) -> Self {
        Self {
            for_task: Some(task_id.into()),
            ..Self::default()
        }
    }
}

/// Successful outcome of a resume request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResumeResponse {
    /// Tasks whose outstanding-token set became empty.
    pub unblocked_tasks: Vec<String>,
}
