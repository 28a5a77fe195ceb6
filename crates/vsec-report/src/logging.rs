//! Structured logging for report generation.

use std::time::Duration;

use tracing::{error, info, warn, Span};

/// Logs report lifecycle events tagged with the report ID and stage.
#[derive(Debug, Clone)]
pub struct ReportLogger {
    report_id: String,
    stage: &'static str,
}

impl ReportLogger {
    pub fn new(report_id: &str, stage: &'static str) -> Self {
        Self {
            report_id: report_id.to_string(),
            stage,
        }
    }

    /// Same report, different stage.
    pub fn for_stage(&self, stage: &'static str) -> Self {
        Self {
            report_id: self.report_id.clone(),
            stage,
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            report_id = %self.report_id,
            stage = self.stage,
            "Report started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            report_id = %self.report_id,
            stage = self.stage,
            "Report progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            report_id = %self.report_id,
            stage = self.stage,
            "Report warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            report_id = %self.report_id,
            stage = self.stage,
            "Report error: {}", message
        );
    }

    /// Log a finished render with its page count and duration.
    pub fn log_completion(&self, pages: usize, elapsed: Duration) {
        info!(
            report_id = %self.report_id,
            stage = self.stage,
            pages,
            elapsed_ms = elapsed.as_millis() as u64,
            "Report completed"
        );
    }

    pub fn report_id(&self) -> &str {
        &self.report_id
    }

    pub fn stage(&self) -> &'static str {
        self.stage
    }

    /// Span wrapping the whole render of one report.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("report", report_id = %self.report_id, stage = self.stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_fields() {
        let logger = ReportLogger::new("a1b2c3d4", "compose");
        assert_eq!(logger.report_id(), "a1b2c3d4");
        assert_eq!(logger.stage(), "compose");

        let thumb = logger.for_stage("thumbnail");
        assert_eq!(thumb.report_id(), "a1b2c3d4");
        assert_eq!(thumb.stage(), "thumbnail");
    }
}
