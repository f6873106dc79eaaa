// Job metrics module
//
// Lightweight counters describing what the converter did during one session

use crate::models::JobState;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Session-wide job metrics
///
/// Uses atomic operations so the GUI thread, the job tasks and the notification
/// bridge can all record without locking. Summarized in the log on shutdown.
#[derive(Debug)]
pub struct JobMetrics {
    /// Jobs accepted by the controller
    pub jobs_started: AtomicU64,

    pub jobs_succeeded: AtomicU64,

    pub jobs_failed: AtomicU64,

    pub jobs_cancelled: AtomicU64,

    /// Start requests rejected (invalid request or slot busy)
    pub starts_rejected: AtomicU64,

    /// Wall-clock time spent in finished jobs, in milliseconds
    pub total_job_time_ms: AtomicU64,

    /// Notifications handed to the bridge
    pub notifications_emitted: AtomicU64,

    /// Notifications lost because the receiving side was gone
    pub notifications_dropped: AtomicU64,

    /// Notifications taken off the bridge by the interactive thread
    pub notifications_drained: AtomicU64,

    start_time: Instant,
}

impl JobMetrics {
    pub fn new() -> Self {
        Self {
            jobs_started: AtomicU64::new(0),
            jobs_succeeded: AtomicU64::new(0),
            jobs_failed: AtomicU64::new(0),
            jobs_cancelled: AtomicU64::new(0),
            starts_rejected: AtomicU64::new(0),
            total_job_time_ms: AtomicU64::new(0),
            notifications_emitted: AtomicU64::new(0),
            notifications_dropped: AtomicU64::new(0),
            notifications_drained: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_job_started(&self) {
        self.jobs_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_start_rejected(&self) {
        self.starts_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the terminal state of a job and how long it took
    pub fn record_job_finished(&self, state: &JobState, duration: Duration) {
        let counter = match state {
            JobState::Succeeded => &self.jobs_succeeded,
            JobState::Cancelled => &self.jobs_cancelled,
            _ => &self.jobs_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.total_job_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_notification_emitted(&self) {
        self.notifications_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notification_dropped(&self) {
        self.notifications_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notifications_drained(&self, count: usize) {
        self.notifications_drained
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn jobs_finished(&self) -> u64 {
        self.jobs_succeeded.load(Ordering::Relaxed)
            + self.jobs_failed.load(Ordering::Relaxed)
            + self.jobs_cancelled.load(Ordering::Relaxed)
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average duration of a finished job in milliseconds
    pub fn avg_job_time_ms(&self) -> f64 {
        let total = self.total_job_time_ms.load(Ordering::Relaxed);
        let count = self.jobs_finished();
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Session Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Jobs: {} started, {} succeeded, {} failed, {} cancelled, {} rejected",
            self.jobs_started.load(Ordering::Relaxed),
            self.jobs_succeeded.load(Ordering::Relaxed),
            self.jobs_failed.load(Ordering::Relaxed),
            self.jobs_cancelled.load(Ordering::Relaxed),
            self.starts_rejected.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Conversion time: {:.2}s (avg: {:.2}ms per job)",
            self.total_job_time_ms.load(Ordering::Relaxed) as f64 / 1000.0,
            self.avg_job_time_ms()
        );
        tracing::info!(
            "Notifications: {} emitted, {} drained, {} dropped",
            self.notifications_emitted.load(Ordering::Relaxed),
            self.notifications_drained.load(Ordering::Relaxed),
            self.notifications_dropped.load(Ordering::Relaxed)
        );
    }
}

impl Default for JobMetrics {
    fn default() -> Self {
        Self::new()
    }
}
