use std::sync::atomic::{AtomicI64, Ordering};

use tracing::debug;

/// Counter sink for appointment lifecycle events. Injected into the
/// scheduler state so services never reach for a global; tests hand in
/// their own recorder and read it back directly.
pub trait MetricsRecorder: Send + Sync {
    fn appointment_created(&self);
    fn appointment_completed(&self);
    fn appointment_cancelled(&self);

    /// Number of appointments currently in the scheduled state, as
    /// tracked by this recorder.
    fn active_appointments(&self) -> i64;
}

/// Default recorder. The active gauge is derived from the three
/// counters rather than re-counted from storage on every mutation.
/// Terminal states never transition, so created minus completed minus
/// cancelled is exact for events seen by this process.
#[derive(Debug, Default)]
pub struct AtomicMetricsRecorder {
    created: AtomicI64,
    completed: AtomicI64,
    cancelled: AtomicI64,
}

impl AtomicMetricsRecorder {
    pub fn created_total(&self) -> i64 {
        self.created.load(Ordering::Relaxed)
    }

    pub fn completed_total(&self) -> i64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn cancelled_total(&self) -> i64 {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl MetricsRecorder for AtomicMetricsRecorder {
    fn appointment_created(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
        debug!("active appointments: {}", self.active_appointments());
    }

    fn appointment_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        debug!("active appointments: {}", self.active_appointments());
    }

    fn appointment_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
        debug!("active appointments: {}", self.active_appointments());
    }

    fn active_appointments(&self) -> i64 {
        let active = self.created.load(Ordering::Relaxed)
            - self.completed.load(Ordering::Relaxed)
            - self.cancelled.load(Ordering::Relaxed);
        active.max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_gauge_tracks_lifecycle_events() {
        let recorder = AtomicMetricsRecorder::default();
        assert_eq!(recorder.active_appointments(), 0);

        recorder.appointment_created();
        recorder.appointment_created();
        recorder.appointment_created();
        assert_eq!(recorder.active_appointments(), 3);

        recorder.appointment_completed();
        recorder.appointment_cancelled();
        assert_eq!(recorder.active_appointments(), 1);
        assert_eq!(recorder.created_total(), 3);
        assert_eq!(recorder.completed_total(), 1);
        assert_eq!(recorder.cancelled_total(), 1);
    }
}
