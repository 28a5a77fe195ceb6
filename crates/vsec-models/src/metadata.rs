//! Derived report metadata.

use chrono::{Local, NaiveDateTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Priority printed on every report.
pub const PRIORITY_LEVEL: &str = "HIGH";
/// Analysis type printed on every report.
pub const ANALYSIS_TYPE: &str = "VIDEO SECURITY";
/// `strftime` pattern of the "Generated Date" row.
pub const GENERATED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Metadata shown in the report's metadata table.
///
/// Computed at generation time from the request and the wall clock; never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReportMetadata {
    /// Report identifier, verbatim from the request
    pub report_id: String,
    /// Local wall-clock time of generation
    pub generated_at: NaiveDateTime,
    /// Always [`PRIORITY_LEVEL`]
    pub priority_level: String,
    /// Always [`ANALYSIS_TYPE`]
    pub analysis_type: String,
}

impl ReportMetadata {
    /// Metadata stamped with the current local time.
    pub fn now(report_id: impl Into<String>) -> Self {
        Self::at(report_id, Local::now().naive_local())
    }

    /// Metadata stamped with a given time.
    pub fn at(report_id: impl Into<String>, generated_at: NaiveDateTime) -> Self {
        Self {
            report_id: report_id.into(),
            generated_at,
            priority_level: PRIORITY_LEVEL.to_string(),
            analysis_type: ANALYSIS_TYPE.to_string(),
        }
    }

    /// Generation time formatted as `YYYY-MM-DD HH:MM:SS`.
    pub fn generated_date(&self) -> String {
        self.generated_at.format(GENERATED_DATE_FORMAT).to_string()
    }

    /// Label/value pairs of the metadata table, in display order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Report ID:", self.report_id.clone()),
            ("Generated Date:", self.generated_date()),
            ("Priority Level:", self.priority_level.clone()),
            ("Analysis Type:", self.analysis_type.clone()),
        ]
    }
}
