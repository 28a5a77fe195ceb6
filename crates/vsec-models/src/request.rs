//! Report request handed over by the calling layer.

use std::fmt;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised when a request fails its preconditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Report ID must not be empty")]
    EmptyReportId,

    #[error("Output path must not be empty")]
    EmptyOutputPath,

    #[error("Output path points to a directory: {0}")]
    OutputIsDirectory(String),
}

/// A single report generation request.
///
/// Immutable for the duration of one generation call. The paths are kept as
/// plain strings so the request can travel through JSON unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReportRequest {
    /// Opaque identifier supplied by the caller
    pub report_id: String,

    /// Free-form analysis text, paragraphs separated by a blank line
    #[serde(default)]
    pub report_text: String,

    /// Destination of the rendered document
    pub output_path: String,

    /// Optional local video used for the footage thumbnail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_path: Option<String>,
}

impl ReportRequest {
    /// Create a request without a video.
    pub fn new(
        report_id: impl Into<String>,
        report_text: impl Into<String>,
        output_path: impl Into<String>,
    ) -> Self {
        Self {
            report_id: report_id.into(),
            report_text: report_text.into(),
            output_path: output_path.into(),
            video_path: None,
        }
    }

    /// Attach a source video.
    pub fn with_video(mut self, video_path: impl Into<String>) -> Self {
        self.video_path = Some(video_path.into());
        self
    }

    /// Destination path as a [`Path`].
    pub fn output_path(&self) -> &Path {
        Path::new(&self.output_path)
    }

    /// Source video path, if one was supplied.
    ///
    /// A blank string counts as "no video".
    pub fn video_path(&self) -> Option<&Path> {
        self.video_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(Path::new)
    }

    /// Whether the analysis text carries no visible content.
    pub fn has_empty_text(&self) -> bool {
        crate::text::is_blank(&self.report_text)
    }

    /// Validate the structural preconditions of the request.
    ///
    /// Empty analysis text is not checked here; whether it is acceptable is
    /// a policy of the composer.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.report_id.trim().is_empty() {
            return Err(RequestError::EmptyReportId);
        }

        if self.output_path.trim().is_empty() {
            return Err(RequestError::EmptyOutputPath);
        }

        if self.output_path().is_dir() {
            return Err(RequestError::OutputIsDirectory(self.output_path.clone()));
        }

        Ok(())
    }
}

impl fmt::Display for ReportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "report {} -> {}", self.report_id, self.output_path)
    }
}

/// Generate a short opaque report identifier.
///
/// Eight lowercase hex characters taken from a random v4 UUID.
pub fn new_report_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}
