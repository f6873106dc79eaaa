//! Data models for the converter.
//!
//! This module contains the plain data structures shared by the job controller,
//! the notification bridge and the GUI:
//! - [`JobRequest`]: One accepted "convert this input into that output" request
//! - [`JobState`]: The controller-owned lifecycle value (Idle → Running → terminal)
//! - [`ProcessResult`]: The exit information of one converter process
//! - [`JobNotification`] / [`JobEvent`]: State transitions delivered to the UI thread
//! - [`FormatCatalog`]: The configured list of output formats
//! - [`UserConfig`]: User preferences loaded from `Converter Config.yaml`
//!
//! # Architecture Note
//!
//! None of these types own threads, locks or processes. The job slot itself lives in
//! [`JobController`](crate::state::JobController), which hands out snapshots of
//! [`JobState`] and emits [`JobNotification`]s through the
//! [`bridge`](crate::ui::bridge).

pub mod config;
pub mod formats;
pub mod job;
pub mod notification;

pub use config::{ConfigError, ConverterSettings, UserConfig};
pub use formats::{FormatCatalog, MediaKind};
pub use job::{FailureReason, JobId, JobRequest, JobState, ProcessResult, RequestProblem};
pub use notification::{JobEvent, JobNotification};
