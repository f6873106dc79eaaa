//! Services module - the external converter process.
//!
//! This module owns everything that touches the OS process running ffmpeg. It has no
//! knowledge of job slots, cancellation flags or the GUI; the
//! [`JobController`](crate::state::JobController) drives it.
//!
//! # Components
//!
//! - [`ProcessHandle`]: One running invocation. Non-blocking `poll()`, idempotent
//!   `terminate()`, async `wait()` that reaps the child, and the captured tail of stderr.
//! - [`Launcher`]: The seam through which the controller starts a process for a
//!   [`JobRequest`](crate::models::JobRequest).
//! - [`FfmpegLauncher`]: The production launcher building
//!   `ffmpeg [-y] -i <input> <output> -progress pipe:1 -nostats`.
//!
//! # Error Handling
//!
//! - [`SpawnError`]: the executable is missing or cannot be started
//! - [`ProcessError`]: the OS failed while polling or reaping the child
//!
//! A non-zero exit is not an error at this level; it is reported as
//! [`PollStatus::Exited`] and resolved by the controller.

pub mod process;
pub mod transcode;

pub use process::{PollStatus, ProcessError, ProcessHandle, SpawnError};
pub use transcode::{FfmpegLauncher, Launcher};
