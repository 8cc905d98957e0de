use std::sync::Arc;

use shared_config::AppConfig;

use crate::services::locks::SlotLockRegistry;
use crate::services::metrics::{AtomicMetricsRecorder, MetricsRecorder};

/// Router state for the appointment cell. Carries the shared lock
/// registry and the injected metrics recorder alongside the config, so
/// every handler invocation books against the same serialization
/// domain and the same counters.
#[derive(Clone)]
pub struct SchedulerState {
    pub config: Arc<AppConfig>,
    pub locks: Arc<SlotLockRegistry>,
    pub metrics: Arc<dyn MetricsRecorder>,
}

impl SchedulerState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self::with_metrics(config, Arc::new(AtomicMetricsRecorder::default()))
    }

    pub fn with_metrics(config: Arc<AppConfig>, metrics: Arc<dyn MetricsRecorder>) -> Self {
        Self {
            config,
            locks: Arc::new(SlotLockRegistry::new()),
            metrics,
        }
    }
}
