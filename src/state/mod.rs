// Job controller module
//
// The JobController owns the single conversion slot. The slot lives in a tokio
// watch channel so that every reader gets a consistent snapshot and shutdown can
// await the slot becoming idle. Each accepted job runs as a tokio task that polls
// its ProcessHandle and reports through the notification bridge.

mod cancel;

pub use cancel::CancelSignal;

use crate::metrics::JobMetrics;
use crate::models::{
    FailureReason, JobEvent, JobId, JobRequest, JobState, ProcessResult, RequestProblem,
};
use crate::services::{Launcher, PollStatus, ProcessError, ProcessHandle};
use crate::ui::bridge::NotificationSender;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::Instrument;

/// Reasons [`JobController::start`] refuses a request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestProblem),

    #[error("a conversion is already running")]
    AlreadyRunning,
}

/// What [`JobController::cancel`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The slot was idle; nothing to cancel
    NotRunning,

    /// The job's cancel signal is set. The terminal notification follows later.
    Requested(JobId),
}

#[derive(Debug, Clone, Default)]
struct Slot {
    state: JobState,
    active: Option<ActiveJob>,
    last_outcome: Option<JobState>,
}

#[derive(Debug, Clone)]
struct ActiveJob {
    id: JobId,
    cancel: CancelSignal,
    pid: Option<u32>,
}

struct Inner {
    slot: watch::Sender<Slot>,
    launcher: Arc<dyn Launcher>,
    notifier: NotificationSender,
    runtime: Handle,
    poll_interval: Duration,
    next_id: AtomicU64,
}

impl Inner {
    fn metrics(&self) -> &JobMetrics {
        self.notifier.metrics()
    }

    /// Mutate the slot only while `id` still owns it
    fn update_active(&self, id: JobId, update: impl FnOnce(&mut Slot)) {
        self.slot.send_if_modified(|slot| {
            if slot.active.as_ref().map(|job| job.id) != Some(id) {
                return false;
            }
            update(slot);
            true
        });
    }

    /// Free the slot, then publish the terminal notification.
    ///
    /// Freeing first means a consumer that sees the terminal notification can start
    /// the next job right away.
    fn finish(&self, id: JobId, state: JobState, request: &JobRequest, elapsed: Duration) {
        self.update_active(id, |slot| {
            slot.state = JobState::Idle;
            slot.active = None;
            slot.last_outcome = Some(state.clone());
        });

        self.metrics().record_job_finished(&state, elapsed);
        match &state {
            JobState::Failed(reason) => {
                tracing::error!("Job {} failed after {:.2}s: {}", id, elapsed.as_secs_f32(), reason)
            }
            other => tracing::info!(
                "Job {} {} after {:.2}s",
                id,
                other.label(),
                elapsed.as_secs_f32()
            ),
        }

        self.notifier.emit(id, JobEvent::terminal(state, request));
    }
}

/// Owner of the single conversion slot.
///
/// Cloning is cheap and every clone controls the same slot. Separate controllers
/// created with [`new()`](Self::new) are fully independent.
///
/// # Usage
///
/// - [`start()`](Self::start) validates a request and hands it to a background task,
///   returning immediately
/// - [`cancel()`](Self::cancel) sets the running job's cancel signal
/// - [`current_state()`](Self::current_state) snapshots the slot from any thread
/// - [`wait_idle()`](Self::wait_idle) resolves once no job owns the slot
///
/// Progress and the terminal outcome of each job arrive through the
/// [`bridge`](crate::ui::bridge) as [`JobNotification`](crate::models::JobNotification)s.
#[derive(Clone)]
pub struct JobController {
    inner: Arc<Inner>,
}

impl JobController {
    /// Create a controller.
    ///
    /// # Arguments
    /// * `launcher` - Starts the converter process for each job
    /// * `notifier` - Producer half of the notification bridge
    /// * `runtime` - Runtime the background jobs are spawned on
    /// * `poll_interval` - Idle wait between two polls of a running process
    pub fn new(
        launcher: Arc<dyn Launcher>,
        notifier: NotificationSender,
        runtime: Handle,
        poll_interval: Duration,
    ) -> Self {
        let (slot, _) = watch::channel(Slot::default());

        Self {
            inner: Arc::new(Inner {
                slot,
                launcher,
                notifier,
                runtime,
                poll_interval,
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Accept a conversion and start it in the background.
    ///
    /// Fails with [`JobError::AlreadyRunning`] if the slot is taken and with
    /// [`JobError::InvalidRequest`] if the request does not validate; in both cases
    /// nothing is spawned. Launch failures are reported asynchronously as a
    /// `Failed` notification.
    pub fn start(&self, request: JobRequest) -> Result<JobId, JobError> {
        if !self.is_idle() {
            return self.reject(JobError::AlreadyRunning);
        }
        // Validated outside the slot lock; snapshot readers never wait on file I/O
        if let Err(problem) = request.validate() {
            return self.reject(problem.into());
        }

        let mut claimed = None;
        self.inner.slot.send_if_modified(|slot| {
            // Another caller may have claimed the slot while the request was validated
            if !slot.state.is_idle() {
                return false;
            }

            let id = JobId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
            let cancel = CancelSignal::new();
            slot.state = JobState::Running;
            slot.active = Some(ActiveJob {
                id,
                cancel: cancel.clone(),
                pid: None,
            });
            claimed = Some((id, cancel));
            true
        });

        let Some((id, cancel)) = claimed else {
            return self.reject(JobError::AlreadyRunning);
        };

        self.inner.metrics().record_job_started();
        tracing::info!(
            "Job {} accepted: {} -> {}",
            id,
            request.input_path(),
            request.output_path()
        );

        self.inner.notifier.emit(
            id,
            JobEvent::Started {
                input: request.input_path().to_path_buf(),
                output: request.output_path().to_path_buf(),
            },
        );
        self.spawn_job(id, request, cancel);

        Ok(id)
    }

    fn reject(&self, error: JobError) -> Result<JobId, JobError> {
        self.inner.metrics().record_start_rejected();
        tracing::warn!("Conversion not started: {}", error);
        Err(error)
    }

    /// Request cancellation of the running job.
    ///
    /// Advisory: the process is stopped by the job's polling loop, and the
    /// `Cancelled` notification arrives once it has been reaped. A no-op without a
    /// notification when the slot is idle.
    pub fn cancel(&self) -> CancelOutcome {
        let active = self.inner.slot.borrow().active.clone();

        match active {
            Some(job) => {
                if job.cancel.request() {
                    tracing::info!("Cancellation requested for job {}", job.id);
                } else {
                    tracing::debug!("Cancellation already requested for job {}", job.id);
                }
                CancelOutcome::Requested(job.id)
            }
            None => {
                tracing::debug!("Cancel ignored - no conversion running");
                CancelOutcome::NotRunning
            }
        }
    }

    /// Snapshot of the slot state
    pub fn current_state(&self) -> JobState {
        self.inner.slot.borrow().state.clone()
    }

    pub fn is_idle(&self) -> bool {
        self.inner.slot.borrow().state.is_idle()
    }

    /// Terminal state of the most recently finished job
    pub fn last_outcome(&self) -> Option<JobState> {
        self.inner.slot.borrow().last_outcome.clone()
    }

    pub fn active_job(&self) -> Option<JobId> {
        self.inner.slot.borrow().active.as_ref().map(|job| job.id)
    }

    /// OS process id of the running job's converter, once launched
    pub fn active_pid(&self) -> Option<u32> {
        self.inner.slot.borrow().active.as_ref().and_then(|job| job.pid)
    }

    /// Resolve once no job owns the slot (immediately if none does)
    pub async fn wait_idle(&self) {
        let mut rx = self.inner.slot.subscribe();
        // The sender lives in `self.inner`, so the channel cannot close while waiting
        let _ = rx.wait_for(|slot| slot.state.is_idle()).await;
    }

    pub fn metrics(&self) -> &Arc<JobMetrics> {
        self.inner.notifier.metrics()
    }

    fn spawn_job(&self, id: JobId, request: JobRequest, cancel: CancelSignal) {
        let span = tracing::info_span!("job", id = id.0);

        let worker = self.inner.runtime.spawn(
            run_job(Arc::clone(&self.inner), id, request.clone(), cancel).instrument(span.clone()),
        );

        // Created up front so the slot is freed even if the supervisor never runs
        let guard = SlotGuard {
            inner: Arc::clone(&self.inner),
            id,
            request,
            started: Instant::now(),
            resolved: false,
        };

        self.inner.runtime.spawn(
            async move {
                let state = match worker.await {
                    Ok(state) => state,
                    Err(e) if e.is_panic() => {
                        let message = panic_message(e.into_panic());
                        tracing::error!("Conversion task panicked: {}", message);
                        JobState::Failed(FailureReason::Internal(format!(
                            "conversion task panicked: {message}"
                        )))
                    }
                    Err(e) => JobState::Failed(FailureReason::Internal(format!(
                        "conversion task stopped unexpectedly: {e}"
                    ))),
                };
                guard.resolve(state);
            }
            .instrument(span),
        );
    }
}

impl fmt::Debug for JobController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.inner.slot.borrow();
        f.debug_struct("JobController")
            .field("state", &slot.state)
            .field("active", &slot.active.as_ref().map(|job| job.id))
            .field("poll_interval", &self.inner.poll_interval)
            .finish()
    }
}

/// Frees the slot exactly once per job, whatever happens to the job task
struct SlotGuard {
    inner: Arc<Inner>,
    id: JobId,
    request: JobRequest,
    started: Instant,
    resolved: bool,
}

impl SlotGuard {
    fn resolve(mut self, state: JobState) {
        self.resolved = true;
        self.inner
            .finish(self.id, state, &self.request, self.started.elapsed());
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        if self.resolved {
            return;
        }
        tracing::error!("Job {} was dropped before it resolved", self.id);
        self.inner.finish(
            self.id,
            JobState::Failed(FailureReason::Internal(
                "conversion task ended before resolving".to_string(),
            )),
            &self.request,
            self.started.elapsed(),
        );
    }
}

/// Background execution unit of one job
async fn run_job(
    inner: Arc<Inner>,
    id: JobId,
    request: JobRequest,
    cancel: CancelSignal,
) -> JobState {
    let mut process = match inner.launcher.launch(&request) {
        Ok(process) => process,
        Err(e) => {
            tracing::error!("Failed to start conversion: {}", e);
            return JobState::Failed(FailureReason::Spawn(e.to_string()));
        }
    };

    let pid = process.id();
    inner.update_active(id, |slot| {
        if let Some(job) = slot.active.as_mut() {
            job.pid = pid;
        }
    });

    match supervise(&inner, id, &mut process, &cancel).await {
        Ok(result) => {
            let stderr = if result.exit_code != 0 && !result.terminated_by_cancel {
                process.captured_stderr().await
            } else {
                String::new()
            };
            result.into_state(stderr)
        }
        Err(e) => {
            tracing::error!("Lost track of the converter process: {}", e);
            process.terminate();
            if let Err(e) = process.wait().await {
                tracing::warn!("Converter process could not be reaped: {}", e);
            }
            JobState::Failed(FailureReason::Internal(e.to_string()))
        }
    }
}

/// Poll until the process exits or cancellation is observed.
///
/// The cancel signal is checked before the exit status on every iteration, so a
/// cancel that races a natural exit resolves to whichever the loop sees first.
async fn supervise(
    inner: &Inner,
    id: JobId,
    process: &mut ProcessHandle,
    cancel: &CancelSignal,
) -> Result<ProcessResult, ProcessError> {
    let started = Instant::now();

    loop {
        if cancel.is_requested() {
            tracing::info!("Cancellation observed - stopping converter");
            process.terminate();
            inner.update_active(id, |slot| slot.state = JobState::Terminating);
            inner.notifier.emit(id, JobEvent::Terminating);

            let exit_code = process.wait().await?;
            return Ok(ProcessResult {
                exit_code,
                terminated_by_cancel: true,
            });
        }

        match process.poll()? {
            PollStatus::Exited(_) => {
                let exit_code = process.wait().await?;
                return Ok(ProcessResult {
                    exit_code,
                    terminated_by_cancel: false,
                });
            }
            PollStatus::Running => {
                inner.notifier.emit(
                    id,
                    JobEvent::StillRunning {
                        elapsed: started.elapsed(),
                    },
                );
                tokio::time::sleep(inner.poll_interval).await;
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
