//! Error types for report composition.

use std::path::PathBuf;
use thiserror::Error;

use vsec_media::MediaError;
use vsec_models::RequestError;

/// Result type for report generation.
pub type ReportResult<T> = Result<T, ReportError>;

/// Result type for rendering steps.
pub type RenderResult<T> = Result<T, RenderError>;

/// Top-level failure of a `compose` call.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Invalid report input: {0}")]
    Input(#[from] InputError),

    #[error("Report rendering failed: {0}")]
    Render(#[from] RenderError),
}

impl ReportError {
    pub fn is_input_error(&self) -> bool {
        matches!(self, ReportError::Input(_))
    }
}

/// Request preconditions that were not met.
#[derive(Debug, Error)]
pub enum InputError {
    #[error(transparent)]
    Invalid(#[from] RequestError),

    #[error("Report text is empty")]
    EmptyReportText,
}

/// Failures that prevent producing the final document.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid style configuration: {0}")]
    Style(String),

    #[error("Failed to write report to {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Thumbnail extraction failed unexpectedly: {0}")]
    Thumbnail(#[from] MediaError),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Document encoding failed: {0}")]
    Encode(String),
}

impl RenderError {
    /// Create a style configuration error.
    pub fn style(message: impl Into<String>) -> Self {
        Self::Style(message.into())
    }

    /// Create an output error for `path`.
    pub fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Output {
            path: path.into(),
            source,
        }
    }

    /// Create a document encoding error.
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode(message.into())
    }
}
