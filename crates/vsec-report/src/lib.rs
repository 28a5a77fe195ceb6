//! Document composer for video security analysis reports.
//!
//! This crate provides:
//! - An immutable [`StyleSheet`] shared by every render
//! - Ordered [`VisualBlock`]s describing report content
//! - A layout engine that paginates blocks onto A4 pages
//! - A page template that repeats the numbered footer on every page
//! - PDF serialization and atomic output
//!
//! ```ignore
//! use vsec_models::ReportRequest;
//! use vsec_report::{ComposerConfig, ReportComposer};
//!
//! let composer = ReportComposer::new(ComposerConfig::default())?;
//! let request = ReportRequest::new("a1b2c3d4", "Incident observed.", "/tmp/report.pdf")
//!     .with_video("/data/camera-3.mp4");
//! let path = composer.compose(&request)?;
//! ```

pub mod block;
pub mod composer;
pub mod decoration;
pub mod error;
pub mod fonts;
pub mod layout;
pub mod logging;
pub mod output;
pub mod pdf;
pub mod raster;
pub mod style;

pub use block::{
    BlockKind, Decoration, DecorationKind, ImageBlock, MetadataTable, Placement, VisualBlock,
};
pub use composer::{
    ComposerConfig, EmptyTextPolicy, RenderedReport, ReportComposer, METADATA_COLUMN_WIDTHS,
};
pub use error::{InputError, RenderError, RenderResult, ReportError, ReportResult};
pub use layout::{lay_out, FragmentRole, Page, PageGeometry};
pub use logging::ReportLogger;
pub use style::{StyleRole, StyleSheet};
