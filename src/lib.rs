// Advanced File Converter - converts media files with ffmpeg from a desktop window
//
// This is the library crate containing the job controller, the process wrapper and
// the notification bridge. The binary crate (main.rs) provides the GUI entry point.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod shutdown;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use metrics::JobMetrics;
pub use models::{ConverterSettings, JobEvent, JobId, JobNotification, JobRequest, JobState};
pub use shutdown::{ShutdownCoordinator, ShutdownReport};
pub use state::{CancelOutcome, JobController, JobError};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
