//! Shared fixtures for the integration tests
//!
//! Jobs run `sh -c <script>` instead of ffmpeg so every outcome can be produced on
//! demand: `exit 0` succeeds, `exit 1` fails, `exec sleep 30` runs until cancelled.

#![allow(dead_code)]

use camino::Utf8PathBuf;
use file_converter::services::{Launcher, ProcessHandle, SpawnError};
use file_converter::ui::bridge::{self, NotificationReceiver};
use file_converter::{JobController, JobEvent, JobMetrics, JobNotification, JobRequest};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::process::Command;

/// Runs a fixed shell script for every job and counts launches
pub struct ShellLauncher {
    script: String,
    launches: Arc<AtomicUsize>,
}

impl ShellLauncher {
    pub fn new(script: &str) -> Self {
        Self {
            script: script.to_string(),
            launches: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn launch_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.launches)
    }
}

impl Launcher for ShellLauncher {
    fn launch(&self, _request: &JobRequest) -> Result<ProcessHandle, SpawnError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        let mut command = Command::new("sh");
        command.arg("-c").arg(&self.script);
        ProcessHandle::spawn(command)
    }
}

/// A controller wired to a receiver, plus a real input file to convert
pub struct Harness {
    pub controller: JobController,
    pub receiver: NotificationReceiver,
    pub metrics: Arc<JobMetrics>,
    pub launches: Arc<AtomicUsize>,
    pub input: Utf8PathBuf,
    _input_file: NamedTempFile,
}

impl Harness {
    pub fn request(&self) -> JobRequest {
        JobRequest::new(self.input.clone(), "/tmp/converted-output.mp4")
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

/// Build a harness; must be called inside a tokio runtime
pub fn harness(script: &str, poll_interval: Duration) -> Harness {
    harness_with(Arc::new(ShellLauncher::new(script)), poll_interval)
}

pub fn harness_with(launcher: Arc<ShellLauncher>, poll_interval: Duration) -> Harness {
    let launches = launcher.launch_counter();
    let metrics = Arc::new(JobMetrics::new());
    let (notifier, receiver) = bridge::channel(Arc::clone(&metrics));
    let controller = JobController::new(
        launcher,
        notifier,
        tokio::runtime::Handle::current(),
        poll_interval,
    );

    let input_file = NamedTempFile::new().unwrap();
    let input = Utf8PathBuf::try_from(input_file.path().to_path_buf()).unwrap();

    Harness {
        controller,
        receiver,
        metrics,
        launches,
        input,
        _input_file: input_file,
    }
}

/// Receive notifications up to and including the first terminal one
pub async fn collect_until_terminal(receiver: &mut NotificationReceiver) -> Vec<JobNotification> {
    let mut collected = Vec::new();
    loop {
        let notification = tokio::time::timeout(Duration::from_secs(10), receiver.recv())
            .await
            .expect("Timeout waiting for a terminal notification")
            .expect("Notification bridge closed");
        let done = notification.event.is_terminal();
        collected.push(notification);
        if done {
            return collected;
        }
    }
}

/// Receive notifications until the first `StillRunning` tick
pub async fn wait_for_tick(receiver: &mut NotificationReceiver) -> Vec<JobNotification> {
    let mut collected = Vec::new();
    loop {
        let notification = tokio::time::timeout(Duration::from_secs(10), receiver.recv())
            .await
            .expect("Timeout waiting for a running tick")
            .expect("Notification bridge closed");
        let tick = matches!(notification.event, JobEvent::StillRunning { .. });
        collected.push(notification);
        if tick {
            return collected;
        }
    }
}

pub fn terminal_count(notifications: &[JobNotification]) -> usize {
    notifications
        .iter()
        .filter(|n| n.event.is_terminal())
        .count()
}
