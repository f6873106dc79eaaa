use super::formats::FormatCatalog;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// User configuration from `Converter Config.yaml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(rename = "Converter_Settings", default)]
    pub settings: ConverterSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterSettings {
    /// ffmpeg executable, either a bare name looked up on PATH or a full path
    #[serde(rename = "FFmpeg Path", default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// Pass `-y` so ffmpeg never stops to ask about an existing output file
    #[serde(rename = "Overwrite Output", default = "default_true")]
    pub overwrite_output: bool,

    /// Idle wait between two polls of the converter process
    #[serde(rename = "Poll Interval MS", default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How often the GUI drains job notifications
    #[serde(rename = "UI Refresh MS", default = "default_ui_refresh_ms")]
    pub ui_refresh_ms: u64,

    /// Upper bound on how long exit waits for a running conversion to stop
    #[serde(rename = "Shutdown Timeout Secs", default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,

    #[serde(rename = "Log Directory", default = "default_log_dir")]
    pub log_dir: String,

    #[serde(rename = "Default Format", default = "default_format")]
    pub default_format: String,

    #[serde(rename = "Supported Formats", default)]
    pub supported_formats: FormatCatalog,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            overwrite_output: true,
            poll_interval_ms: default_poll_interval_ms(),
            ui_refresh_ms: default_ui_refresh_ms(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
            debug_mode: false,
            log_dir: default_log_dir(),
            default_format: default_format(),
            supported_formats: FormatCatalog::builtin(),
        }
    }
}

impl ConverterSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn ui_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.ui_refresh_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Reject settings the converter cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ffmpeg_path.trim().is_empty() {
            return Err(ConfigError::EmptyFfmpegPath);
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("Poll Interval MS"));
        }
        if self.ui_refresh_ms == 0 {
            return Err(ConfigError::ZeroInterval("UI Refresh MS"));
        }
        if self.supported_formats.is_empty() {
            return Err(ConfigError::NoFormats);
        }
        if !self.supported_formats.contains(&self.default_format) {
            return Err(ConfigError::UnknownDefaultFormat(self.default_format.clone()));
        }
        Ok(())
    }
}

/// Errors found while validating [`ConverterSettings`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("'FFmpeg Path' must not be empty")]
    EmptyFfmpegPath,

    #[error("'{0}' must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("'Supported Formats' must list at least one format")]
    NoFormats,

    #[error("default format {0} is not in 'Supported Formats'")]
    UnknownDefaultFormat(String),
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_true() -> bool {
    true
}

fn default_poll_interval_ms() -> u64 {
    25
}

fn default_ui_refresh_ms() -> u64 {
    50
}

fn default_shutdown_timeout_secs() -> u64 {
    5
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_format() -> String {
    "MP4".to_string()
}
