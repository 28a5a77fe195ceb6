//! Shared data models for the video security report pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Report requests handed over by the calling layer
//! - Derived report metadata (the fixed metadata table)
//! - Paragraph splitting of free-form analysis text

pub mod metadata;
pub mod request;
pub mod text;

// Re-export common types
pub use metadata::{
    ReportMetadata, ANALYSIS_TYPE, GENERATED_DATE_FORMAT, PRIORITY_LEVEL,
};
pub use request::{new_report_id, RequestError, ReportRequest};
pub use text::{is_blank, split_paragraphs};

/// Document title rendered at the top of every report.
pub const REPORT_TITLE: &str = "SECURITY ANALYSIS REPORT";

/// Header band of the metadata table.
pub const METADATA_HEADER: &str = "REPORT DETAILS";

/// Caption placed under the embedded video frame.
pub const FOOTAGE_CAPTION: &str = "Video Security Footage";

/// Heading introducing the analysis body.
pub const ANALYSIS_HEADING: &str = "DETAILED ANALYSIS";

/// Label drawn inside the header badge.
pub const SECURE_BADGE_LABEL: &str = "SECURE";
