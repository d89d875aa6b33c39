//! Core data model definitions shared across fleetd crates.

pub mod error;
pub mod fleet;
pub mod log;
pub mod tasks;

// Intentionally curated re-exports for downstream consumers.
pub use error::{ModelError, Result as ModelResult};
pub use fleet::{FleetState, Location, RobotMode, RobotState};
pub use log::{FleetLog, LogEntry, TaskEventLog, Tier};
pub use tasks::{
    TaskInterruptRequest, TaskInterruptionResponse, TaskResumeRequest,
    TaskResumeResponse,
};
