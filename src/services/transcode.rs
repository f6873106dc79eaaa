use super::process::{ProcessHandle, SpawnError};
use crate::models::{ConverterSettings, JobRequest};
use camino::{Utf8Path, Utf8PathBuf};
use tokio::process::Command;

/// Starts the external process for a job.
///
/// The job controller only ever talks to this trait, so tests can substitute any
/// program for ffmpeg.
pub trait Launcher: Send + Sync + 'static {
    fn launch(&self, request: &JobRequest) -> Result<ProcessHandle, SpawnError>;
}

/// Launches ffmpeg for a conversion.
///
/// The invocation is
/// `ffmpeg [-y] -i <input> <output> -progress pipe:1 -nostats`:
/// the output container is implied by the output extension, progress goes to stdout
/// in machine-readable form and the interactive stats line on stderr is suppressed
/// so stderr only carries diagnostics.
#[derive(Debug, Clone)]
pub struct FfmpegLauncher {
    program: Utf8PathBuf,
    overwrite: bool,
}

impl FfmpegLauncher {
    pub fn new(program: impl Into<Utf8PathBuf>) -> Self {
        Self {
            program: program.into(),
            overwrite: true,
        }
    }

    pub fn from_settings(settings: &ConverterSettings) -> Self {
        Self::new(settings.ffmpeg_path.as_str()).with_overwrite(settings.overwrite_output)
    }

    /// When disabled ffmpeg refuses to replace an existing output and exits non-zero
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn program(&self) -> &Utf8Path {
        &self.program
    }

    /// Command line arguments for `request`, without the program name
    pub fn build_args(&self, request: &JobRequest) -> Vec<String> {
        let mut args = Vec::with_capacity(8);

        if self.overwrite {
            args.push("-y".to_string());
        }
        args.push("-i".to_string());
        args.push(request.input_path().to_string());
        args.push(request.output_path().to_string());
        args.extend(["-progress", "pipe:1", "-nostats"].map(String::from));

        args
    }

    pub fn command(&self, request: &JobRequest) -> Command {
        let mut command = Command::new(self.program.as_std_path());
        command.args(self.build_args(request));

        // Keep Windows from flashing a console window for ffmpeg
        #[cfg(windows)]
        command.creation_flags(0x0800_0000);

        command
    }
}

impl Default for FfmpegLauncher {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl Launcher for FfmpegLauncher {
    fn launch(&self, request: &JobRequest) -> Result<ProcessHandle, SpawnError> {
        tracing::info!(
            "Executing: {} {}",
            self.program,
            self.build_args(request).join(" ")
        );
        ProcessHandle::spawn(self.command(request))
    }
}
