//! First-frame thumbnail extraction.
//!
//! The extractor never fails just because a video is missing or unplayable:
//! those cases come back as [`FrameOutcome::Unavailable`]. Only unexpected
//! failures (no space for the temporary file, a decoder that cannot be
//! spawned) are returned as errors.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::{debug, info, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Prefix of every temporary thumbnail file.
pub const THUMBNAIL_PREFIX: &str = "vsec-thumb-";
/// Extension of every temporary thumbnail file.
pub const THUMBNAIL_SUFFIX: &str = ".jpg";
/// FFmpeg JPEG quality scale used for the still (2 = best).
const THUMBNAIL_QUALITY: u8 = 2;

/// Why no thumbnail could be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailUnavailable {
    /// The video path does not exist
    SourceMissing(PathBuf),
    /// The video path exists but is not a regular file
    NotAFile(PathBuf),
    /// No FFmpeg executable could be found
    DecoderMissing(String),
    /// FFmpeg could not decode a frame
    DecodeFailed {
        exit_code: Option<i32>,
        stderr: Option<String>,
    },
    /// Decoding finished without producing a frame
    NoFrames,
}

impl ThumbnailUnavailable {
    /// Short label used for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SourceMissing(_) => "source_missing",
            Self::NotAFile(_) => "not_a_file",
            Self::DecoderMissing(_) => "decoder_missing",
            Self::DecodeFailed { .. } => "decode_failed",
            Self::NoFrames => "no_frames",
        }
    }
}

impl fmt::Display for ThumbnailUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceMissing(path) => write!(f, "video not found: {}", path.display()),
            Self::NotAFile(path) => write!(f, "video is not a file: {}", path.display()),
            Self::DecoderMissing(bin) => write!(f, "decoder not available: {}", bin),
            Self::DecodeFailed { exit_code, stderr } => {
                write!(f, "decode failed (exit code {:?})", exit_code)?;
                if let Some(stderr) = stderr {
                    write!(f, ": {}", stderr)?;
                }
                Ok(())
            }
            Self::NoFrames => write!(f, "video has no decodable frame"),
        }
    }
}

/// A temporary still image owned by exactly one report generation.
///
/// The file is removed when the artifact is dropped, so it cannot outlive the
/// call that created it, whatever path that call takes out.
#[derive(Debug)]
pub struct ThumbnailArtifact {
    path: TempPath,
    source: PathBuf,
}

impl ThumbnailArtifact {
    /// Location of the temporary image.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Video the frame was taken from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Read the encoded image.
    pub fn read_bytes(&self) -> MediaResult<Vec<u8>> {
        Ok(fs::read(&self.path)?)
    }

    /// Delete the temporary image now, reporting any failure.
    pub fn close(self) -> MediaResult<()> {
        Ok(self.path.close()?)
    }
}

/// Result of a frame extraction attempt.
#[derive(Debug)]
pub enum FrameOutcome {
    Extracted(ThumbnailArtifact),
    Unavailable(ThumbnailUnavailable),
}

impl FrameOutcome {
    /// The artifact, if one was produced.
    pub fn into_artifact(self) -> Option<ThumbnailArtifact> {
        match self {
            Self::Extracted(artifact) => Some(artifact),
            Self::Unavailable(_) => None,
        }
    }

    pub fn is_extracted(&self) -> bool {
        matches!(self, Self::Extracted(_))
    }
}

/// Pulls the first decodable frame out of a video.
#[derive(Debug, Clone, Default)]
pub struct FrameExtractor {
    /// Directory for temporary thumbnails (system temp dir when unset)
    temp_dir: Option<PathBuf>,
    runner: FfmpegRunner,
}

impl FrameExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place temporary thumbnails in `dir`.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Use a specific FFmpeg executable.
    pub fn with_ffmpeg_bin(mut self, binary: impl Into<String>) -> Self {
        self.runner = self.runner.with_binary(binary);
        self
    }

    /// Extract the first frame of `video_path` into a temporary JPEG.
    pub fn extract(&self, video_path: impl AsRef<Path>) -> MediaResult<FrameOutcome> {
        let video_path = video_path.as_ref();

        let outcome = self.try_extract(video_path)?;
        match &outcome {
            FrameOutcome::Extracted(artifact) => {
                info!(
                    video = %video_path.display(),
                    thumbnail = %artifact.path().display(),
                    "Extracted video thumbnail"
                );
            }
            FrameOutcome::Unavailable(reason) => {
                warn!(
                    video = %video_path.display(),
                    reason = reason.as_str(),
                    "Thumbnail unavailable: {}", reason
                );
                metrics::counter!("vsec_thumbnail_unavailable_total", "reason" => reason.as_str())
                    .increment(1);
            }
        }
        Ok(outcome)
    }

    fn try_extract(&self, video_path: &Path) -> MediaResult<FrameOutcome> {
        if !video_path.exists() {
            return Ok(unavailable(ThumbnailUnavailable::SourceMissing(
                video_path.to_path_buf(),
            )));
        }
        if !video_path.is_file() {
            return Ok(unavailable(ThumbnailUnavailable::NotAFile(
                video_path.to_path_buf(),
            )));
        }
        if self.runner.locate().is_err() {
            return Ok(unavailable(ThumbnailUnavailable::DecoderMissing(
                self.runner.binary().to_string(),
            )));
        }

        let path = self.create_temp_path()?;
        debug!(thumbnail = %path.display(), "Created thumbnail placeholder");

        let cmd = FfmpegCommand::new(video_path, &path)
            .first_video_stream()
            .single_frame()
            .still_image(THUMBNAIL_QUALITY)
            .log_level("error");

        // `path` is dropped (and the file deleted) on every early return below.
        match self.runner.run(&cmd) {
            Ok(()) => {}
            Err(MediaError::FfmpegFailed {
                stderr, exit_code, ..
            }) => {
                return Ok(unavailable(ThumbnailUnavailable::DecodeFailed {
                    exit_code,
                    stderr,
                }));
            }
            Err(MediaError::FfmpegNotFound(bin)) => {
                return Ok(unavailable(ThumbnailUnavailable::DecoderMissing(bin)));
            }
            Err(e) => return Err(e),
        }

        if fs::metadata(&path)?.len() == 0 {
            return Ok(unavailable(ThumbnailUnavailable::NoFrames));
        }

        Ok(FrameOutcome::Extracted(ThumbnailArtifact {
            path,
            source: video_path.to_path_buf(),
        }))
    }

    fn create_temp_path(&self) -> MediaResult<TempPath> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(THUMBNAIL_PREFIX).suffix(THUMBNAIL_SUFFIX);

        let file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(MediaError::TempFile)?;
        Ok(file.into_temp_path())
    }
}

fn unavailable(reason: ThumbnailUnavailable) -> FrameOutcome {
    FrameOutcome::Unavailable(reason)
}

/// Extract the first frame of a video with the default extractor.
pub fn extract_frame(video_path: impl AsRef<Path>) -> MediaResult<FrameOutcome> {
    FrameExtractor::new().extract(video_path)
}
