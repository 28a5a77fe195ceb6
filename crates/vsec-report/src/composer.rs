//! Report composition: request in, paginated PDF out.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDateTime};

use vsec_media::{FrameExtractor, FrameOutcome};
use vsec_models::{
    split_paragraphs, ReportMetadata, ReportRequest, ANALYSIS_HEADING, FOOTAGE_CAPTION,
    METADATA_HEADER, REPORT_TITLE,
};

use crate::block::{BlockKind, Decoration, ImageBlock, MetadataTable, VisualBlock};
use crate::error::{InputError, RenderError, RenderResult, ReportError, ReportResult};
use crate::layout::{lay_out, Page, PageGeometry, INCH};
use crate::logging::ReportLogger;
use crate::output::write_atomically;
use crate::pdf::{write_pdf, DocumentInfo};
use crate::raster::{prepare_image, DEFAULT_MAX_IMAGE_WIDTH};
use crate::style::StyleSheet;

/// Label and value column widths of the metadata table.
pub const METADATA_COLUMN_WIDTHS: [f32; 2] = [2.5 * INCH, 3.75 * INCH];

/// Space after the title and after the metadata table.
const SECTION_SPACER: f32 = 20.0;
/// Space closing the analysis body.
const TRAILING_SPACER: f32 = 30.0;

/// What to do with a request whose text has no content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyTextPolicy {
    /// Render a complete document without body paragraphs
    #[default]
    Render,
    /// Refuse the request with [`InputError::EmptyReportText`]
    Reject,
}

impl EmptyTextPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Render => "render",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for EmptyTextPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmptyTextPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "render" => Ok(Self::Render),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown empty text policy: {other}")),
        }
    }
}

/// Composer configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposerConfig {
    /// Directory for temporary thumbnails (system temp dir when unset)
    pub temp_dir: Option<PathBuf>,
    /// FFmpeg executable (looked up on `PATH` when unset)
    pub ffmpeg_bin: Option<String>,
    /// Handling of requests whose text is blank
    pub empty_text: EmptyTextPolicy,
    /// Frames wider than this many pixels are downscaled
    pub max_image_width: u32,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            ffmpeg_bin: None,
            empty_text: EmptyTextPolicy::default(),
            max_image_width: DEFAULT_MAX_IMAGE_WIDTH,
        }
    }
}

/// Builds security analysis reports.
///
/// Holds only read-only state, so one composer can serve any number of
/// generation calls, including concurrent ones for distinct output paths.
#[derive(Debug, Clone)]
pub struct ReportComposer {
    styles: Arc<StyleSheet>,
    extractor: FrameExtractor,
    config: ComposerConfig,
    geometry: PageGeometry,
}

impl ReportComposer {
    /// Composer with the standard style sheet.
    pub fn new(config: ComposerConfig) -> RenderResult<Self> {
        Self::with_styles(Arc::new(StyleSheet::security_report()), config)
    }

    /// Composer with a custom style sheet, validated up front.
    pub fn with_styles(styles: Arc<StyleSheet>, config: ComposerConfig) -> RenderResult<Self> {
        styles.validate()?;

        let mut extractor = FrameExtractor::new();
        if let Some(dir) = &config.temp_dir {
            extractor = extractor.with_temp_dir(dir);
        }
        if let Some(bin) = &config.ffmpeg_bin {
            extractor = extractor.with_ffmpeg_bin(bin);
        }

        Ok(Self {
            styles,
            extractor,
            config,
            geometry: PageGeometry::a4(),
        })
    }

    pub fn styles(&self) -> &Arc<StyleSheet> {
        &self.styles
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Render the request to its output path, stamped with the current time.
    pub fn compose(&self, request: &ReportRequest) -> ReportResult<PathBuf> {
        self.compose_at(request, Local::now().naive_local())
    }

    /// Render the request to its output path, stamped with `generated_at`.
    pub fn compose_at(
        &self,
        request: &ReportRequest,
        generated_at: NaiveDateTime,
    ) -> ReportResult<PathBuf> {
        let logger = ReportLogger::new(&request.report_id, "compose");
        let _span = logger.create_span().entered();
        let started = Instant::now();

        match self.compose_inner(request, generated_at, &logger) {
            Ok(pages) => {
                metrics::counter!("vsec_reports_rendered_total").increment(1);
                metrics::histogram!("vsec_report_pages").record(pages as f64);
                logger.log_completion(pages, started.elapsed());
                Ok(request.output_path().to_path_buf())
            }
            Err(e) => {
                let kind = if e.is_input_error() { "input" } else { "render" };
                metrics::counter!("vsec_reports_failed_total", "kind" => kind).increment(1);
                logger.log_error(&e.to_string());
                Err(e)
            }
        }
    }

    fn compose_inner(
        &self,
        request: &ReportRequest,
        generated_at: NaiveDateTime,
        logger: &ReportLogger,
    ) -> ReportResult<usize> {
        let metadata = ReportMetadata::at(&request.report_id, generated_at);
        let report = self.render(request, &metadata)?;
        let bytes = report.to_pdf_bytes()?;

        logger.log_progress(&format!(
            "writing {} bytes to {}",
            bytes.len(),
            request.output_path().display()
        ));
        write_atomically(request.output_path(), &bytes)?;

        Ok(report.page_count())
    }

    /// Validate the request, assemble its blocks and paginate them.
    ///
    /// Nothing is written to the output path. A thumbnail extracted along the
    /// way is deleted before this returns.
    pub fn render(
        &self,
        request: &ReportRequest,
        metadata: &ReportMetadata,
    ) -> ReportResult<RenderedReport> {
        request.validate().map_err(InputError::from)?;
        if request.has_empty_text() {
            match self.config.empty_text {
                EmptyTextPolicy::Reject => return Err(InputError::EmptyReportText.into()),
                EmptyTextPolicy::Render => {
                    tracing::debug!(report_id = %request.report_id, "Rendering report without body text");
                }
            }
        }

        let logger = ReportLogger::new(&request.report_id, "render");
        logger.log_start(&format!("output {}", request.output_path().display()));

        let image = match request.video_path() {
            Some(video) => self.thumbnail_block(video, &logger.for_stage("thumbnail"))?,
            None => None,
        };

        let blocks = Self::build_blocks(metadata, &request.report_text, image);
        let pages = lay_out(&blocks, &self.styles, &self.geometry);
        logger.log_progress(&format!("laid out {} blocks on {} pages", blocks.len(), pages.len()));

        Ok(RenderedReport {
            metadata: metadata.clone(),
            blocks,
            pages,
            geometry: self.geometry,
        })
    }

    /// Extract and prepare the footage frame.
    ///
    /// Expected absence and embedding problems yield `Ok(None)`; only
    /// unexpected extractor failures are errors.
    fn thumbnail_block(
        &self,
        video: &Path,
        logger: &ReportLogger,
    ) -> RenderResult<Option<ImageBlock>> {
        let artifact = match self.extractor.extract(video).map_err(RenderError::from)? {
            FrameOutcome::Extracted(artifact) => artifact,
            FrameOutcome::Unavailable(_) => return Ok(None),
        };

        let prepared = artifact
            .read_bytes()
            .map_err(RenderError::from)
            .and_then(|bytes| prepare_image(&bytes, self.config.max_image_width));

        if let Err(e) = artifact.close() {
            logger.log_warning(&format!("failed to delete thumbnail: {e}"));
        }

        match prepared {
            Ok(block) => Ok(Some(block)),
            Err(e) => {
                logger.log_warning(&format!("skipping footage frame: {e}"));
                metrics::counter!("vsec_thumbnail_embed_failed_total").increment(1);
                Ok(None)
            }
        }
    }

    /// Assemble the report's blocks in display order.
    pub fn build_blocks(
        metadata: &ReportMetadata,
        report_text: &str,
        image: Option<ImageBlock>,
    ) -> Vec<VisualBlock> {
        let mut blocks = vec![
            VisualBlock::PageDecoration(Decoration::header()),
            VisualBlock::title(REPORT_TITLE),
            VisualBlock::spacer(SECTION_SPACER),
            VisualBlock::MetadataTable(MetadataTable {
                header: METADATA_HEADER.to_string(),
                rows: metadata
                    .rows()
                    .into_iter()
                    .map(|(label, value)| (label.to_string(), value))
                    .collect(),
                column_widths: METADATA_COLUMN_WIDTHS,
            }),
            VisualBlock::spacer(SECTION_SPACER),
        ];

        if let Some(image) = image {
            blocks.push(VisualBlock::Image(image));
            blocks.push(VisualBlock::heading(FOOTAGE_CAPTION));
        }

        blocks.push(VisualBlock::heading(ANALYSIS_HEADING));
        blocks.extend(split_paragraphs(report_text).into_iter().map(VisualBlock::body));
        blocks.push(VisualBlock::spacer(TRAILING_SPACER));
        blocks.push(VisualBlock::PageDecoration(Decoration::footer()));
        blocks
    }
}

/// A fully laid-out report, ready to be encoded.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub metadata: ReportMetadata,
    pub blocks: Vec<VisualBlock>,
    pub pages: Vec<Page>,
    pub geometry: PageGeometry,
}

impl RenderedReport {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Body paragraph texts in document order.
    pub fn body_paragraphs(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter(|b| b.kind() == BlockKind::BodyParagraph)
            .filter_map(VisualBlock::text)
            .collect()
    }

    pub fn has_image(&self) -> bool {
        self.blocks.iter().any(|b| b.kind() == BlockKind::Image)
    }

    /// Rows of the metadata table.
    pub fn metadata_rows(&self) -> Option<&[(String, String)]> {
        self.blocks.iter().find_map(|b| match b {
            VisualBlock::MetadataTable(table) => Some(table.rows.as_slice()),
            _ => None,
        })
    }

    /// Encode the report as PDF.
    pub fn to_pdf_bytes(&self) -> RenderResult<Vec<u8>> {
        let info = DocumentInfo {
            title: REPORT_TITLE.to_string(),
            subject: format!("Report {}", self.metadata.report_id),
            created: self.metadata.generated_at,
        };
        write_pdf(&self.pages, &self.blocks, &self.geometry, &info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::FragmentRole;
    use chrono::NaiveDate;

    fn metadata() -> ReportMetadata {
        let ts = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        ReportMetadata::at("abc12345", ts)
    }

    fn kinds(blocks: &[VisualBlock]) -> Vec<BlockKind> {
        blocks.iter().map(VisualBlock::kind).collect()
    }

    fn image() -> ImageBlock {
        ImageBlock {
            jpeg: vec![0xFF, 0xD8],
            pixel_width: 320,
            pixel_height: 240,
            display_width: 432.0,
            display_height: 288.0,
        }
    }

    #[test]
    fn test_block_order_without_image() {
        let blocks = ReportComposer::build_blocks(&metadata(), "One.\n\nTwo.", None);
        assert_eq!(
            kinds(&blocks),
            vec![
                BlockKind::PageDecoration,
                BlockKind::Title,
                BlockKind::Spacer,
                BlockKind::MetadataTable,
                BlockKind::Spacer,
                BlockKind::SectionHeading,
                BlockKind::BodyParagraph,
                BlockKind::BodyParagraph,
                BlockKind::Spacer,
                BlockKind::PageDecoration,
            ]
        );
        assert_eq!(blocks[5].text(), Some(ANALYSIS_HEADING));
    }

    #[test]
    fn test_block_order_with_image() {
        let blocks = ReportComposer::build_blocks(&metadata(), "One.", Some(image()));
        assert_eq!(blocks[5].kind(), BlockKind::Image);
        assert_eq!(blocks[6].text(), Some(FOOTAGE_CAPTION));
        assert_eq!(blocks[7].text(), Some(ANALYSIS_HEADING));
    }

    #[test]
    fn test_no_page_is_left_with_only_the_footer() {
        let styles = StyleSheet::security_report();
        let geometry = PageGeometry::a4();
        for n in 1..120 {
            let text: Vec<String> = (0..n).map(|i| format!("Finding {i}")).collect();
            let blocks = ReportComposer::build_blocks(&metadata(), &text.join("\n\n"), None);
            let pages = lay_out(&blocks, &styles, &geometry);
            let last = pages.last().unwrap();
            assert!(
                last.items
                    .iter()
                    .any(|p| !matches!(p.fragment.role, FragmentRole::Decoration(_))),
                "{n} paragraphs leave a blank page {}",
                last.number
            );
        }
    }

    #[test]
    fn test_metadata_table_widths_fit_frame() {
        let total: f32 = METADATA_COLUMN_WIDTHS.iter().sum();
        assert!(total <= PageGeometry::a4().frame_width());
    }

    #[test]
    fn test_empty_text_policy_parse() {
        assert_eq!("render".parse::<EmptyTextPolicy>(), Ok(EmptyTextPolicy::Render));
        assert_eq!(" Reject ".parse::<EmptyTextPolicy>(), Ok(EmptyTextPolicy::Reject));
        assert!("skip".parse::<EmptyTextPolicy>().is_err());
        assert_eq!(EmptyTextPolicy::default().to_string(), "render");
    }

    #[test]
    fn test_invalid_styles_rejected() {
        let mut styles = StyleSheet::security_report();
        styles.title.font_size = -1.0;
        let result = ReportComposer::with_styles(Arc::new(styles), ComposerConfig::default());
        assert!(matches!(result, Err(RenderError::Style(_))));
    }

    #[test]
    fn test_render_rejects_empty_text_when_configured() {
        let composer = ReportComposer::new(ComposerConfig {
            empty_text: EmptyTextPolicy::Reject,
            ..ComposerConfig::default()
        })
        .unwrap();
        let request = ReportRequest::new("abc12345", "  \n\n ", "out.pdf");
        let err = composer.render(&request, &metadata()).unwrap_err();
        assert!(matches!(err, ReportError::Input(InputError::EmptyReportText)));
    }

    #[test]
    fn test_render_rejects_missing_id() {
        let composer = ReportComposer::new(ComposerConfig::default()).unwrap();
        let request = ReportRequest::new("", "text", "out.pdf");
        let err = composer.render(&request, &metadata()).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_rendered_report_accessors() {
        let composer = ReportComposer::new(ComposerConfig::default()).unwrap();
        let request = ReportRequest::new("abc12345", "Alpha.\n\nBeta.", "out.pdf");
        let report = composer.render(&request, &metadata()).unwrap();

        assert_eq!(report.page_count(), 1);
        assert_eq!(report.body_paragraphs(), vec!["Alpha.", "Beta."]);
        assert!(!report.has_image());
        let rows = report.metadata_rows().unwrap();
        assert_eq!(rows[0], ("Report ID:".to_string(), "abc12345".to_string()));
        assert_eq!(report.pages[0].footer_label(), Some("Page 1".to_string()));
    }
}
