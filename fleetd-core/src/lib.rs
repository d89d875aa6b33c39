//! Core services of the fleetd server.
//!
//! This crate owns the pieces both HTTP surfaces share:
//!
//! - [`StateStore`]: validated, keyed upsert/read access to fleet states and
//!   fleet logs through a pluggable [`persistence::FleetRepository`].
//! - [`TaskEventLogService`]: append-and-merge bookkeeping of per-task event
//!   logs and phase records.
//! - [`InterruptionTokenRegistry`]: the token lifecycle of the task
//!   interruption/resume protocol.
//!
//! All of them are constructed once at process start and passed by reference
//! to both surfaces; there are no hidden singletons.

pub mod error;
pub mod interruption;
pub mod persistence;
pub mod state_store;
pub mod task_log;

pub use error::{CoreError, Result};
pub use interruption::{InterruptionTokenRegistry, ResumeOutcome};
pub use persistence::{FleetRepository, MemoryRepository, PostgresRepository};
pub use state_store::StateStore;
pub use task_log::TaskEventLogService;
