// Shutdown coordination
//
// Runs once after the GUI event loop has returned: cancels whatever job is still
// active and waits, bounded, for the slot to settle before the runtime goes away.

use crate::models::JobId;
use crate::state::{CancelOutcome, JobController};
use std::time::{Duration, Instant};

/// How the application left the job slot on exit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReport {
    /// No job was running
    Idle,

    /// The running job was cancelled and reached a terminal state in time
    Settled { job: JobId, waited: Duration },

    /// The timeout elapsed first; the converter may outlive the application
    Orphaned { job: JobId, pid: Option<u32> },
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        !matches!(self, Self::Orphaned { .. })
    }
}

/// Cancels the active job on exit and waits at most `timeout` for it
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
    controller: JobController,
    timeout: Duration,
}

impl ShutdownCoordinator {
    pub fn new(controller: JobController, timeout: Duration) -> Self {
        Self {
            controller,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Cancel any active job and wait for the slot to become idle.
    ///
    /// Never waits longer than the configured timeout. On timeout the possibly
    /// orphaned process is logged and shutdown proceeds anyway.
    pub async fn shutdown(&self) -> ShutdownReport {
        let job = match self.controller.cancel() {
            CancelOutcome::NotRunning => {
                tracing::info!("Shutdown: no conversion running");
                return ShutdownReport::Idle;
            }
            CancelOutcome::Requested(job) => job,
        };

        tracing::warn!(
            "Shutdown while job {} is active - waiting up to {:?} for it to stop",
            job,
            self.timeout
        );

        let pid = self.controller.active_pid();
        let started = Instant::now();

        match tokio::time::timeout(self.timeout, self.controller.wait_idle()).await {
            Ok(()) => {
                let waited = started.elapsed();
                tracing::info!("Job {} settled after {:?}", job, waited);
                ShutdownReport::Settled { job, waited }
            }
            Err(_) => {
                let pid = self.controller.active_pid().or(pid);
                match pid {
                    Some(pid) => tracing::error!(
                        "Job {} did not stop within {:?}; converter process {} may be orphaned",
                        job,
                        self.timeout,
                        pid
                    ),
                    None => tracing::error!(
                        "Job {} did not stop within {:?}; converter process may be orphaned",
                        job,
                        self.timeout
                    ),
                }
                ShutdownReport::Orphaned { job, pid }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::JobMetrics;
    use crate::services::{FfmpegLauncher, Launcher};
    use crate::ui::bridge;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_shutdown_when_idle() {
        let (notifier, mut receiver) = bridge::channel(Arc::new(JobMetrics::new()));
        let launcher: Arc<dyn Launcher> = Arc::new(FfmpegLauncher::default());
        let controller = JobController::new(
            launcher,
            notifier,
            tokio::runtime::Handle::current(),
            Duration::from_millis(25),
        );

        let coordinator = ShutdownCoordinator::new(controller, Duration::from_secs(1));
        let report = coordinator.shutdown().await;

        assert_eq!(report, ShutdownReport::Idle);
        assert!(report.is_clean());
        assert!(receiver.try_next().is_none());
    }

    #[test]
    fn test_orphaned_report_is_not_clean() {
        let report = ShutdownReport::Orphaned {
            job: JobId(4),
            pid: Some(1234),
        };
        assert!(!report.is_clean());
        assert!(
            ShutdownReport::Settled {
                job: JobId(4),
                waited: Duration::ZERO
            }
            .is_clean()
        );
    }
}
