//! Advanced File Converter
//!
//! Main entry point for the GUI application.
//!
//! # Overview
//!
//! The binary wires the library together:
//! - Configuration loading ([`ConfigManager`], `Converter Data/Converter Config.yaml`)
//! - Logging infrastructure (daily log file + console output)
//! - Tokio runtime hosting the conversion jobs
//! - The [`JobController`] and its notification bridge
//! - GUI controller ([`GuiController`])
//!
//! Threading model:
//! - **Main thread**: runs the Slint event loop and drains job notifications
//! - **Tokio workers**: run the background job that polls ffmpeg
//!
//! # Execution Flow
//!
//! 1. Load and validate the user configuration
//! 2. Initialize logging
//! 3. Create the tokio runtime
//! 4. Create the notification bridge, JobController and GuiController
//! 5. Run the Slint event loop (blocks until the window closes or Exit is pressed)
//! 6. Cancel any running job and wait for it, bounded by the shutdown timeout
//! 7. Shut the runtime down

use anyhow::{Context, Result};
use file_converter::services::FfmpegLauncher;
use file_converter::ui::{GuiController, NativeFilePicker, bridge};
use file_converter::{
    APP_NAME, ConfigManager, JobController, JobMetrics, ShutdownCoordinator, VERSION,
};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    let config_manager = ConfigManager::new("Converter Data")?;
    let user_config = config_manager.ensure_user_config()?;
    let settings = user_config.settings;
    settings
        .validate()
        .with_context(|| format!("Invalid settings in {}", config_manager.user_config_path()))?;

    // Held until the end of main so buffered log lines are flushed
    let _log_guard = file_converter::logging::setup_logging_with_console(
        &settings.log_dir,
        "converter",
        settings.debug_mode,
        true,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    tracing::info!(
        "Settings: ffmpeg={}, poll={:?}, ui_refresh={:?}, formats={}",
        settings.ffmpeg_path,
        settings.poll_interval(),
        settings.ui_refresh_interval(),
        settings.supported_formats.len()
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("converter-worker")
        .build()
        .context("Failed to create tokio runtime")?;

    let metrics = Arc::new(JobMetrics::new());
    let (notifier, receiver) = bridge::channel(Arc::clone(&metrics));

    let jobs = JobController::new(
        Arc::new(FfmpegLauncher::from_settings(&settings)),
        notifier,
        runtime.handle().clone(),
        settings.poll_interval(),
    );

    let gui = GuiController::new(jobs.clone(), receiver, Rc::new(NativeFilePicker), &settings)?;

    tracing::info!("GUI controller initialized, launching window");

    let result = gui.run();

    tracing::info!("GUI closed, shutting down");

    let coordinator = ShutdownCoordinator::new(jobs, settings.shutdown_timeout());
    let report = runtime.block_on(coordinator.shutdown());
    tracing::info!("Shutdown report: {:?}", report);

    metrics.log_summary();

    runtime.shutdown_timeout(Duration::from_secs(1));

    tracing::info!("Application shutdown complete");

    result.map_err(|e| {
        tracing::error!("GUI error: {}", e);
        anyhow::anyhow!("GUI error: {}", e)
    })
}
