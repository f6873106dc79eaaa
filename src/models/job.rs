use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::fs::{self, File};
use std::io;
use thiserror::Error;

/// Identifier handed out by the controller for every accepted request.
///
/// Ids increase monotonically per controller, so notifications from an older job
/// can always be told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A request to convert one input file into one output path.
///
/// The output format is implied by the output path's extension; ffmpeg picks the
/// container and codecs from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    input_path: Utf8PathBuf,
    output_path: Utf8PathBuf,
}

impl JobRequest {
    pub fn new(input_path: impl Into<Utf8PathBuf>, output_path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
        }
    }

    pub fn input_path(&self) -> &Utf8Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Utf8Path {
        &self.output_path
    }

    /// Output format name derived from the output extension, upper-cased
    /// (`clip.mp4` → `MP4`). `None` when the output has no extension.
    pub fn output_format(&self) -> Option<String> {
        self.output_path
            .extension()
            .filter(|ext| !ext.is_empty())
            .map(str::to_uppercase)
    }

    /// Check that both paths are present and that the input is a readable file.
    ///
    /// This is a point-in-time check: the file may disappear before ffmpeg opens it,
    /// in which case the conversion itself fails.
    pub fn validate(&self) -> Result<(), RequestProblem> {
        if self.input_path.as_str().trim().is_empty() {
            return Err(RequestProblem::MissingInput);
        }
        if self.output_path.as_str().trim().is_empty() {
            return Err(RequestProblem::MissingOutput);
        }

        let metadata = match fs::metadata(&self.input_path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(RequestProblem::InputNotFound(self.input_path.clone()));
            }
            Err(e) => {
                return Err(RequestProblem::InputUnreadable {
                    path: self.input_path.clone(),
                    reason: e.to_string(),
                });
            }
        };

        if !metadata.is_file() {
            return Err(RequestProblem::NotAFile(self.input_path.clone()));
        }

        File::open(&self.input_path).map_err(|e| RequestProblem::InputUnreadable {
            path: self.input_path.clone(),
            reason: e.to_string(),
        })?;

        Ok(())
    }
}

/// Reasons a [`JobRequest`] is rejected before any process is spawned
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestProblem {
    #[error("no input file specified")]
    MissingInput,

    #[error("no output path specified")]
    MissingOutput,

    #[error("input file not found: {0}")]
    InputNotFound(Utf8PathBuf),

    #[error("input path is not a file: {0}")]
    NotAFile(Utf8PathBuf),

    #[error("input file cannot be read: {path} ({reason})")]
    InputUnreadable { path: Utf8PathBuf, reason: String },
}

impl RequestProblem {
    /// True when the user simply left a field empty
    pub fn is_missing_path(&self) -> bool {
        matches!(self, Self::MissingInput | Self::MissingOutput)
    }
}

/// Why a job ended in [`JobState::Failed`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The converter executable could not be launched
    #[error("could not start the converter: {0}")]
    Spawn(String),

    /// The converter ran and exited with a non-zero code
    #[error("Conversion failed (ffmpeg exited with code {exit_code})")]
    ProcessFailure { exit_code: i32, stderr: String },

    /// Something unexpected went wrong inside the background job
    #[error("internal error: {0}")]
    Internal(String),
}

impl FailureReason {
    /// Technical details worth showing next to the message (captured stderr)
    pub fn details(&self) -> &str {
        match self {
            Self::ProcessFailure { stderr, .. } => stderr,
            Self::Spawn(_) | Self::Internal(_) => "",
        }
    }
}

/// Lifecycle of the controller's single job slot.
///
/// A job moves `Idle → Running → [Terminating] → Succeeded | Failed | Cancelled`
/// and the slot then returns to `Idle`. No value is revisited within one job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum JobState {
    #[default]
    Idle,
    Running,
    /// Cancellation observed, the process has been told to stop and is being reaped
    Terminating,
    Succeeded,
    Failed(FailureReason),
    Cancelled,
}

impl JobState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Running or Terminating: a background job owns the slot
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Terminating)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_) | Self::Cancelled)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Terminating => "terminating",
            Self::Succeeded => "succeeded",
            Self::Failed(_) => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Exit information of one converter process, produced once per job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessResult {
    pub exit_code: i32,
    pub terminated_by_cancel: bool,
}

impl ProcessResult {
    /// Resolve the terminal state. `stderr` is attached to non-zero exits.
    pub fn into_state(self, stderr: String) -> JobState {
        if self.terminated_by_cancel {
            JobState::Cancelled
        } else if self.exit_code == 0 {
            JobState::Succeeded
        } else {
            JobState::Failed(FailureReason::ProcessFailure {
                exit_code: self.exit_code,
                stderr,
            })
        }
    }
}
