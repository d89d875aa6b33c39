use std::{fmt, sync::Arc};

use fleetd_core::{InterruptionTokenRegistry, StateStore, TaskEventLogService};

use crate::infra::config::Config;

/// Shared dependencies of both surfaces.
///
/// Constructed once at process start and handed by reference to the public
/// and gateway routers; there are no ambient singletons.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StateStore>,
    pub task_logs: Arc<TaskEventLogService>,
    pub interruptions: Arc<InterruptionTokenRegistry>,
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        store: Arc<StateStore>,
        task_logs: Arc<TaskEventLogService>,
        interruptions: Arc<InterruptionTokenRegistry>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            store,
            task_logs,
            interruptions,
            config,
        }
    }
}
