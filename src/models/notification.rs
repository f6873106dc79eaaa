use super::job::{FailureReason, JobId, JobRequest, JobState};
use camino::Utf8PathBuf;
use std::time::Duration;

/// A state transition of one job, as delivered to the interactive thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobNotification {
    pub job: JobId,
    pub event: JobEvent,
}

/// What happened to a job.
///
/// Every job emits `Started`, any number of `StillRunning` ticks, optionally
/// `Terminating`, and finally exactly one terminal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    Started {
        input: Utf8PathBuf,
        output: Utf8PathBuf,
    },

    /// Heartbeat emitted once per poll while the converter is still working
    StillRunning { elapsed: Duration },

    /// Cancellation was observed and the process is being stopped
    Terminating,

    Succeeded {
        /// Upper-cased output extension, e.g. `MP4` (empty when the output has none)
        format: String,
        output: Utf8PathBuf,
    },

    Failed(FailureReason),

    Cancelled,
}

impl JobEvent {
    /// Build the terminal event for a resolved job
    ///
    /// Non-terminal states are reported as an internal failure; the controller never
    /// resolves a job with one.
    pub fn terminal(state: JobState, request: &JobRequest) -> Self {
        match state {
            JobState::Succeeded => Self::Succeeded {
                format: request.output_format().unwrap_or_default(),
                output: request.output_path().to_path_buf(),
            },
            JobState::Failed(reason) => Self::Failed(reason),
            JobState::Cancelled => Self::Cancelled,
            other => Self::Failed(FailureReason::Internal(format!(
                "job resolved in non-terminal state '{}'",
                other.label()
            ))),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed(_) | Self::Cancelled)
    }

    /// The job state this event reports
    pub fn state(&self) -> JobState {
        match self {
            Self::Started { .. } | Self::StillRunning { .. } => JobState::Running,
            Self::Terminating => JobState::Terminating,
            Self::Succeeded { .. } => JobState::Succeeded,
            Self::Failed(reason) => JobState::Failed(reason.clone()),
            Self::Cancelled => JobState::Cancelled,
        }
    }

    /// Short text for the status label
    pub fn status_line(&self) -> String {
        match self {
            Self::Started { .. } => "Converting... Please wait.".to_string(),
            Self::StillRunning { elapsed } => {
                format!("Converting... Please wait. ({}s)", elapsed.as_secs())
            }
            Self::Terminating => "Cancelling conversion...".to_string(),
            Self::Succeeded { .. } => "Conversion completed successfully!".to_string(),
            Self::Failed(_) => "Conversion failed.".to_string(),
            Self::Cancelled => "Conversion cancelled.".to_string(),
        }
    }
}
