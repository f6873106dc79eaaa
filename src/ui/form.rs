// Form glue between the window's fields and the job controller
//
// Everything here is plain data so it can be tested without a window.

use super::pickers::{FilePicker, with_default_extension};
use crate::models::{FormatCatalog, JobEvent, JobRequest, RequestProblem};
use crate::state::JobError;
use camino::Utf8PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Info,
    Warning,
    Error,
}

impl DialogKind {
    /// Name used by the `dialog-kind` property in `main.slint`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A modal message box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub kind: DialogKind,
    pub title: String,
    pub message: String,
    pub details: String,
}

impl Dialog {
    fn new(kind: DialogKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            details: String::new(),
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DialogKind::Info, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DialogKind::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DialogKind::Error, title, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }
}

fn input_missing() -> Dialog {
    Dialog::warning("Input Missing", "Please specify both input and output paths.")
}

/// Build a request from the raw text of the two path fields
pub fn request_from_fields(input: &str, output: &str) -> Result<JobRequest, Dialog> {
    let (input, output) = (input.trim(), output.trim());
    if input.is_empty() || output.is_empty() {
        return Err(input_missing());
    }
    Ok(JobRequest::new(input, output))
}

/// Dialog explaining why the controller refused to start
pub fn dialog_for_start_error(error: &JobError) -> Dialog {
    match error {
        JobError::InvalidRequest(problem) if problem.is_missing_path() => input_missing(),
        JobError::InvalidRequest(RequestProblem::InputNotFound(_)) => {
            Dialog::error("File Not Found", "Input file not found.")
        }
        JobError::InvalidRequest(problem) => {
            Dialog::error("Error", format!("Error in file conversion: {problem}"))
        }
        JobError::AlreadyRunning => Dialog::warning(
            "Conversion Running",
            "A conversion is already in progress. Cancel it or wait for it to finish.",
        ),
    }
}

pub fn success_message(format: &str) -> String {
    if format.is_empty() {
        "File has been converted!".to_string()
    } else {
        format!("File has been converted to {format}!")
    }
}

/// Dialog to show for a notification, if any. Only `Succeeded` and `Failed` get one;
/// a cancellation is reported in the status line alone.
pub fn dialog_for_outcome(event: &JobEvent) -> Option<Dialog> {
    match event {
        JobEvent::Succeeded { format, .. } => {
            Some(Dialog::info("Conversion Successful", success_message(format)))
        }
        JobEvent::Failed(reason) => Some(
            Dialog::error("Error", format!("Error in file conversion: {reason}"))
                .with_details(reason.details()),
        ),
        _ => None,
    }
}

/// Run the save dialog for the selected format
pub fn choose_output(picker: &dyn FilePicker, format: &str) -> Option<Utf8PathBuf> {
    let extension = FormatCatalog::extension_for(format);
    picker
        .choose_save_path(&extension)
        .map(|path| with_default_extension(path, &extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FailureReason;
    use crate::ui::pickers::MockFilePicker;
    use camino::Utf8PathBuf;
    use mockall::predicate::eq;

    #[test]
    fn test_blank_fields_warn() {
        for (input, output) in [("", "out.mp4"), ("in.mov", "   "), ("", "")] {
            let dialog = request_from_fields(input, output).unwrap_err();
            assert_eq!(dialog.kind, DialogKind::Warning);
            assert_eq!(dialog.title, "Input Missing");
            assert_eq!(dialog.message, "Please specify both input and output paths.");
        }
    }

    #[test]
    fn test_fields_are_trimmed() {
        let request = request_from_fields("  in.mov ", " out.mp4").unwrap();
        assert_eq!(request.input_path(), "in.mov");
        assert_eq!(request.output_path(), "out.mp4");
    }

    #[test]
    fn test_missing_input_file_dialog() {
        let error = JobError::InvalidRequest(RequestProblem::InputNotFound("gone.mov".into()));
        let dialog = dialog_for_start_error(&error);

        assert_eq!(dialog.kind, DialogKind::Error);
        assert_eq!(dialog.title, "File Not Found");
        assert_eq!(dialog.message, "Input file not found.");
    }

    #[test]
    fn test_busy_slot_dialog_is_a_warning() {
        assert_eq!(
            dialog_for_start_error(&JobError::AlreadyRunning).kind,
            DialogKind::Warning
        );
    }

    #[test]
    fn test_success_dialog_names_format() {
        let event = JobEvent::Succeeded {
            format: "MP4".to_string(),
            output: Utf8PathBuf::from("clip.mp4"),
        };
        let dialog = dialog_for_outcome(&event).unwrap();

        assert_eq!(dialog.title, "Conversion Successful");
        assert_eq!(dialog.message, "File has been converted to MP4!");
        assert_eq!(success_message(""), "File has been converted!");
    }

    #[test]
    fn test_failure_dialog_carries_stderr() {
        let event = JobEvent::Failed(FailureReason::ProcessFailure {
            exit_code: 1,
            stderr: "Invalid data found when processing input".to_string(),
        });
        let dialog = dialog_for_outcome(&event).unwrap();

        assert_eq!(dialog.kind, DialogKind::Error);
        assert_eq!(
            dialog.message,
            "Error in file conversion: Conversion failed (ffmpeg exited with code 1)"
        );
        assert_eq!(dialog.details, "Invalid data found when processing input");
    }

    #[test]
    fn test_cancel_and_progress_have_no_dialog() {
        assert!(dialog_for_outcome(&JobEvent::Cancelled).is_none());
        assert!(dialog_for_outcome(&JobEvent::Terminating).is_none());
    }

    #[test]
    fn test_choose_output_appends_format_extension() {
        let mut picker = MockFilePicker::new();
        picker
            .expect_choose_save_path()
            .with(eq("webm"))
            .times(1)
            .returning(|_| Some(Utf8PathBuf::from("/out/holiday")));

        assert_eq!(
            choose_output(&picker, "WEBM"),
            Some(Utf8PathBuf::from("/out/holiday.webm"))
        );
    }

    #[test]
    fn test_choose_output_cancelled() {
        let mut picker = MockFilePicker::new();
        picker.expect_choose_save_path().returning(|_| None);

        assert_eq!(choose_output(&picker, "MP3"), None);
    }
}
