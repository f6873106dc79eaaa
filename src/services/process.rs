use std::collections::VecDeque;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

/// Number of trailing stderr lines kept for error reporting
const STDERR_TAIL_LINES: usize = 20;

/// How long to wait for the stderr reader after the process has been reaped
const STDERR_COLLECT_TIMEOUT: Duration = Duration::from_millis(250);

/// The converter process could not be started
#[derive(Error, Debug)]
pub enum SpawnError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// OS-level failure while supervising a running process
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to poll converter process: {0}")]
    Poll(#[source] io::Error),

    #[error("failed to reap converter process: {0}")]
    Wait(#[source] io::Error),
}

/// Result of a single non-blocking poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Running,
    Exited(i32),
}

/// One running converter invocation.
///
/// The child's stdin is closed, stdout (ffmpeg's `-progress` stream) is drained in a
/// background task so the tool never blocks on a full pipe, and the tail of stderr is
/// captured for error reporting. The child is killed if the handle is dropped before
/// it has been reaped.
pub struct ProcessHandle {
    program: String,
    child: Child,
    pid: Option<u32>,
    exit_code: Option<i32>,
    terminate_requested: bool,
    stderr_tail: Option<JoinHandle<String>>,
}

impl ProcessHandle {
    /// Spawn `command` with piped output. Must be called from within a tokio runtime.
    pub fn spawn(mut command: Command) -> Result<Self, SpawnError> {
        let program = command
            .as_std()
            .get_program()
            .to_string_lossy()
            .into_owned();

        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| SpawnError::Launch {
            program: program.clone(),
            source,
        })?;

        let pid = child.id();

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(drain_progress(stdout));
        }
        let stderr_tail = child
            .stderr
            .take()
            .map(|stderr| tokio::spawn(collect_tail(stderr, STDERR_TAIL_LINES)));

        tracing::info!(pid = ?pid, "Spawned {}", program);

        Ok(Self {
            program,
            child,
            pid,
            exit_code: None,
            terminate_requested: false,
            stderr_tail,
        })
    }

    /// OS process id, if the process was still running when spawned
    pub fn id(&self) -> Option<u32> {
        self.pid
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Whether [`terminate()`](Self::terminate) has sent a stop signal
    pub fn was_terminated(&self) -> bool {
        self.terminate_requested
    }

    /// Check for exit without blocking
    pub fn poll(&mut self) -> Result<PollStatus, ProcessError> {
        if let Some(code) = self.exit_code {
            return Ok(PollStatus::Exited(code));
        }

        match self.child.try_wait().map_err(ProcessError::Poll)? {
            Some(status) => {
                let code = exit_code_of(status);
                self.exit_code = Some(code);
                Ok(PollStatus::Exited(code))
            }
            None => Ok(PollStatus::Running),
        }
    }

    /// Ask the process to stop.
    ///
    /// Best effort and idempotent: a second call, or a call after the process has
    /// exited, does nothing.
    pub fn terminate(&mut self) {
        if self.exit_code.is_some() || self.terminate_requested {
            tracing::debug!(pid = ?self.pid, "Terminate ignored - process already stopped");
            return;
        }

        self.terminate_requested = true;
        match self.child.start_kill() {
            Ok(()) => tracing::info!(pid = ?self.pid, "Sent stop signal to {}", self.program),
            Err(e) => tracing::warn!(pid = ?self.pid, "Failed to signal {}: {}", self.program, e),
        }
    }

    /// Wait until the OS reports the process has exited and reap it
    pub async fn wait(&mut self) -> Result<i32, ProcessError> {
        let status = self.child.wait().await.map_err(ProcessError::Wait)?;
        let code = exit_code_of(status);
        self.exit_code = Some(code);

        tracing::debug!(pid = ?self.pid, "{} exited with code {}", self.program, code);
        Ok(code)
    }

    /// The last lines the process wrote to stderr.
    ///
    /// Only complete once the process has exited; returns what was collected if the
    /// stream does not close promptly.
    pub async fn captured_stderr(&mut self) -> String {
        let Some(reader) = self.stderr_tail.take() else {
            return String::new();
        };

        match tokio::time::timeout(STDERR_COLLECT_TIMEOUT, reader).await {
            Ok(Ok(tail)) => tail,
            Ok(Err(e)) => {
                tracing::warn!("stderr reader task failed: {}", e);
                String::new()
            }
            Err(_) => {
                tracing::debug!("stderr of {} still open after exit", self.program);
                String::new()
            }
        }
    }
}

/// Map an exit status to a single integer; signals map to `128 + signal` on unix
fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}

/// Consume ffmpeg's `-progress` key=value stream, returning the number of reports
async fn drain_progress<R: AsyncRead + Unpin>(stdout: R) -> u64 {
    let mut lines = BufReader::new(stdout).lines();
    let mut reports = 0u64;

    while let Ok(Some(line)) = lines.next_line().await {
        if let Some((key, value)) = line.split_once('=') {
            if key == "progress" {
                reports += 1;
                tracing::trace!("progress report {}: {}", reports, value);
            }
        }
    }

    tracing::debug!("Progress stream closed after {} reports", reports);
    reports
}

/// Read a stream to the end, keeping only the last `max_lines` lines
async fn collect_tail<R: AsyncRead + Unpin>(stream: R, max_lines: usize) -> String {
    let mut lines = BufReader::new(stream).lines();
    let mut tail = VecDeque::with_capacity(max_lines);

    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        if tail.len() == max_lines {
            tail.pop_front();
        }
        tail.push_back(line);
    }

    Vec::from(tail).join("\n")
}
