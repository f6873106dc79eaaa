// GUI Controller - wires the Slint window to the job controller
//
// All Slint calls happen on the interactive (main) thread:
// - Callbacks read the form and call into the JobController, which returns at once
// - A repeating Slint timer drains the notification bridge and updates the window
//
// No background task ever touches the window.

use crate::models::{ConverterSettings, JobEvent, JobNotification};
use crate::state::{CancelOutcome, JobController};
use crate::ui::bridge::NotificationReceiver;
use crate::ui::form::{self, Dialog};
use crate::ui::pickers::FilePicker;
use anyhow::{Context, Result};
use slint::{ModelRc, SharedString, Timer, TimerMode, VecModel};
use std::rc::Rc;
use std::time::Duration;

// Include the generated Slint code
slint::include_modules!();

/// Owns the window and the timer that feeds it job notifications
///
/// # Example
/// ```ignore
/// let (notifier, receiver) = bridge::channel(metrics);
/// let jobs = JobController::new(launcher, notifier, runtime.handle().clone(), poll);
///
/// let gui = GuiController::new(jobs, receiver, Rc::new(NativeFilePicker), &settings)?;
/// gui.run()?; // Blocks until the window is closed or Exit is pressed
/// ```
pub struct GuiController {
    ui: MainWindow,

    jobs: JobController,

    /// Stops draining when dropped
    _drain_timer: Timer,
}

impl GuiController {
    pub fn new(
        jobs: JobController,
        receiver: NotificationReceiver,
        picker: Rc<dyn FilePicker>,
        settings: &ConverterSettings,
    ) -> Result<Self> {
        let ui = MainWindow::new().context("Failed to create Slint UI")?;

        Self::init_form(&ui, settings);
        Self::setup_callbacks(&ui, &jobs, picker);
        let drain_timer = Self::start_drain_timer(&ui, receiver, settings.ui_refresh_interval());

        tracing::info!("GUI controller initialized");

        Ok(Self {
            ui,
            jobs,
            _drain_timer: drain_timer,
        })
    }

    /// Run the event loop until the window closes or Exit is pressed
    pub fn run(self) -> Result<(), slint::PlatformError> {
        tracing::info!("Starting GUI event loop");
        let result = self.ui.run();

        if self.jobs.is_idle() {
            tracing::info!("GUI event loop finished");
        } else {
            tracing::warn!(
                "GUI event loop finished while {:?} is active",
                self.jobs.active_job()
            );
        }
        result
    }

    fn init_form(ui: &MainWindow, settings: &ConverterSettings) {
        let formats: Vec<SharedString> = settings
            .supported_formats
            .names()
            .map(SharedString::from)
            .collect();

        ui.set_formats(ModelRc::new(VecModel::from(formats)));
        ui.set_selected_format(settings.default_format.as_str().into());
        ui.set_is_converting(false);
        ui.set_status_text(SharedString::new());
        ui.set_show_dialog(false);
    }

    fn setup_callbacks(ui: &MainWindow, jobs: &JobController, picker: Rc<dyn FilePicker>) {
        let ui_weak = ui.as_weak();
        let input_picker = Rc::clone(&picker);

        ui.on_browse_input(move || {
            let Some(ui) = ui_weak.upgrade() else { return };
            if let Some(path) = input_picker.choose_input() {
                tracing::debug!("Input selected: {}", path);
                ui.set_input_path(path.as_str().into());
            }
        });

        let ui_weak = ui.as_weak();

        ui.on_browse_output(move || {
            let Some(ui) = ui_weak.upgrade() else { return };
            let format = ui.get_selected_format();
            if let Some(path) = form::choose_output(picker.as_ref(), &format) {
                tracing::debug!("Output selected: {}", path);
                ui.set_output_path(path.as_str().into());
            }
        });

        let ui_weak = ui.as_weak();
        let start_jobs = jobs.clone();

        ui.on_start_conversion(move || {
            let Some(ui) = ui_weak.upgrade() else { return };
            tracing::info!("Convert button clicked");

            let request = match form::request_from_fields(
                &ui.get_input_path(),
                &ui.get_output_path(),
            ) {
                Ok(request) => request,
                Err(dialog) => return Self::show_dialog(&ui, &dialog),
            };

            match start_jobs.start(request) {
                Ok(id) => {
                    tracing::debug!("Job {} handed to the controller", id);
                    ui.set_is_converting(true);
                }
                Err(e) => Self::show_dialog(&ui, &form::dialog_for_start_error(&e)),
            }
        });

        let ui_weak = ui.as_weak();
        let cancel_jobs = jobs.clone();

        ui.on_cancel_conversion(move || {
            tracing::info!("Cancel button clicked");
            if cancel_jobs.cancel() == CancelOutcome::NotRunning {
                return;
            }
            if let Some(ui) = ui_weak.upgrade() {
                ui.set_status_text("Cancelling conversion...".into());
            }
        });

        ui.on_exit_requested(|| {
            tracing::info!("Exit button clicked");
            if let Err(e) = slint::quit_event_loop() {
                tracing::error!("Failed to stop the event loop: {}", e);
            }
        });

        let ui_weak = ui.as_weak();

        ui.on_dialog_dismissed(move || {
            if let Some(ui) = ui_weak.upgrade() {
                ui.set_show_dialog(false);
            }
        });

        ui.window().on_close_requested(|| {
            tracing::info!("Close requested - leaving the event loop");
            slint::CloseRequestResponse::HideWindow
        });

        tracing::debug!("UI callbacks configured");
    }

    fn start_drain_timer(
        ui: &MainWindow,
        mut receiver: NotificationReceiver,
        interval: Duration,
    ) -> Timer {
        let ui_weak = ui.as_weak();
        let timer = Timer::default();

        timer.start(TimerMode::Repeated, interval, move || {
            let Some(ui) = ui_weak.upgrade() else { return };
            for notification in receiver.drain() {
                Self::apply_notification(&ui, &notification);
            }
        });

        timer
    }

    fn apply_notification(ui: &MainWindow, notification: &JobNotification) {
        let event = &notification.event;
        ui.set_status_text(event.status_line().into());

        match event {
            JobEvent::Started { .. } => ui.set_is_converting(true),
            JobEvent::StillRunning { .. } | JobEvent::Terminating => {}
            JobEvent::Succeeded { .. } | JobEvent::Failed(_) | JobEvent::Cancelled => {
                tracing::debug!("Job {} finished: {:?}", notification.job, event);
                ui.set_is_converting(false);
                if let Some(dialog) = form::dialog_for_outcome(event) {
                    Self::show_dialog(ui, &dialog);
                }
            }
        }
    }

    fn show_dialog(ui: &MainWindow, dialog: &Dialog) {
        ui.set_dialog_kind(dialog.kind.as_str().into());
        ui.set_dialog_title(dialog.title.as_str().into());
        ui.set_dialog_message(dialog.message.as_str().into());
        ui.set_dialog_details(dialog.details.as_str().into());
        ui.set_show_dialog(true);
    }
}
