//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Default FFmpeg executable name, resolved through `PATH`.
pub const DEFAULT_FFMPEG_BIN: &str = "ffmpeg";

/// Longest stderr excerpt kept on a failed run.
const MAX_STDERR_CHARS: usize = 2000;

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            log_level: "error".to_string(),
        }
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Select the first video stream and drop audio.
    pub fn first_video_stream(self) -> Self {
        self.output_args(["-map", "0:v:0", "-an"])
    }

    /// Extract single frame.
    pub fn single_frame(self) -> Self {
        self.output_arg("-frames:v").output_arg("1")
    }

    /// Write a still image with the given JPEG quality scale (2 = best).
    pub fn still_image(self, quality: u8) -> Self {
        self.output_args(["-q:v".to_string(), quality.to_string()])
            .output_args(["-f", "image2"])
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Build the command arguments.
    ///
    /// The output is always overwritten: callers hand in a freshly reserved
    /// placeholder path.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec!["-y".to_string()];

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        // Never wait on stdin
        args.push("-nostdin".to_string());

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.clone());

        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Blocking runner for FFmpeg commands.
///
/// `run` waits for the child to exit on every path, so the decoder never
/// outlives the call that started it.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    /// Executable name or absolute path
    binary: String,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRunner {
    /// Create a runner using `ffmpeg` from `PATH`.
    pub fn new() -> Self {
        Self {
            binary: DEFAULT_FFMPEG_BIN.to_string(),
        }
    }

    /// Use a specific FFmpeg executable.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Executable this runner invokes.
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Resolve the executable.
    pub fn locate(&self) -> MediaResult<PathBuf> {
        which::which(&self.binary).map_err(|_| MediaError::FfmpegNotFound(self.binary.clone()))
    }

    /// Run an FFmpeg command to completion.
    pub fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        let program = self.locate()?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: {} {}", program.display(), args.join(" "));

        let output = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = truncate_stderr(stderr.trim());
            Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                (!stderr.is_empty()).then_some(stderr),
                output.status.code(),
            ))
        }
    }
}

fn truncate_stderr(stderr: &str) -> String {
    if stderr.chars().count() <= MAX_STDERR_CHARS {
        return stderr.to_string();
    }
    let tail: String = stderr
        .chars()
        .rev()
        .take(MAX_STDERR_CHARS)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("...{}", tail)
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    FfmpegRunner::new().locate()
}
