//! Layout and pagination.
//!
//! Blocks are turned into fragments (the smallest units that may not be
//! split across pages: a text line, a table row, an image) which are then
//! stacked into the content frame of successive pages. Decorations placed
//! by the page template are added after pagination, once the number of
//! physical pages is known.

use crate::block::{DecorationKind, ImageBlock, MetadataTable, Placement, VisualBlock};
use crate::decoration::{self, PageTemplate};
use crate::fonts::{baseline_offset, Font};
use crate::style::{Alignment, Color, ParagraphStyle, StyleSheet, TableStyle};

/// Points per inch.
pub const INCH: f32 = 72.0;
/// A4 width in points.
pub const A4_WIDTH_PT: f32 = 595.2756;
/// A4 height in points.
pub const A4_HEIGHT_PT: f32 = 841.8898;

/// Tolerance for floating-point fit checks.
const FIT_EPSILON: f32 = 0.01;

/// Fixed page geometry: page size and a uniform margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageGeometry {
    /// A4 with 1 inch margins on all sides.
    pub const fn a4() -> Self {
        Self {
            width: A4_WIDTH_PT,
            height: A4_HEIGHT_PT,
            margin: INCH,
        }
    }

    pub fn frame_left(&self) -> f32 {
        self.margin
    }

    pub fn frame_top(&self) -> f32 {
        self.margin
    }

    pub fn frame_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    pub fn frame_height(&self) -> f32 {
        self.height - 2.0 * self.margin
    }
}

/// Stroke parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

/// A drawing instruction in fragment-local coordinates.
///
/// `x` grows to the right from the fragment's left edge and `y` grows
/// downwards from the fragment's top edge.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        baseline: f32,
        font: Font,
        size: f32,
        color: Color,
        text: String,
    },
    /// Page number label, right-aligned at `right`; resolved per physical page
    PageNumber {
        right: f32,
        baseline: f32,
        font: Font,
        size: f32,
        color: Color,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        stroke: Stroke,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    /// Image of the block at `block` in the report's block list
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        block: usize,
    },
}

/// What a fragment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentRole {
    Decoration(DecorationKind),
    Title,
    TableHeader,
    TableRow(usize),
    Image,
    Heading,
    BodyLine,
    Spacer,
}

/// An unsplittable slice of content.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub role: FragmentRole,
    pub height: f32,
    /// Space above, dropped at the top of a page
    pub gap_before: f32,
    /// Space below, dropped at the bottom of a page
    pub gap_after: f32,
    /// Dropped entirely when it would start or overflow a page
    pub discardable: bool,
    pub ops: Vec<DrawOp>,
}

impl Fragment {
    fn new(role: FragmentRole, height: f32, ops: Vec<DrawOp>) -> Self {
        Self {
            role,
            height,
            gap_before: 0.0,
            gap_after: 0.0,
            discardable: false,
            ops,
        }
    }
}

/// A fragment positioned on a page, in page coordinates from the top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct Placed {
    pub x: f32,
    pub y: f32,
    /// Index of the originating block
    pub block: usize,
    pub fragment: Fragment,
}

/// One physical page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based position in the document
    pub number: usize,
    pub items: Vec<Placed>,
}

impl Page {
    fn new(number: usize) -> Self {
        Self {
            number,
            items: Vec::new(),
        }
    }

    /// Text drawn on the page in drawing order, with page numbers resolved.
    pub fn text_runs(&self) -> Vec<String> {
        self.items
            .iter()
            .flat_map(|placed| placed.fragment.ops.iter())
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.clone()),
                DrawOp::PageNumber { .. } => Some(decoration::page_label(self.number)),
                _ => None,
            })
            .collect()
    }

    /// Resolved footer label, if the page carries one.
    pub fn footer_label(&self) -> Option<String> {
        self.items
            .iter()
            .filter(|p| p.fragment.role == FragmentRole::Decoration(DecorationKind::Footer))
            .flat_map(|p| p.fragment.ops.iter())
            .find_map(|op| match op {
                DrawOp::PageNumber { .. } => Some(decoration::page_label(self.number)),
                _ => None,
            })
    }

    /// Items with a given role.
    pub fn items_with_role(&self, role: FragmentRole) -> impl Iterator<Item = &Placed> {
        self.items.iter().filter(move |p| p.fragment.role == role)
    }

    /// Block indices of images drawn on this page.
    pub fn image_blocks(&self) -> Vec<usize> {
        self.items
            .iter()
            .flat_map(|p| p.fragment.ops.iter())
            .filter_map(|op| match op {
                DrawOp::Image { block, .. } => Some(*block),
                _ => None,
            })
            .collect()
    }
}

/// Lay out blocks onto pages.
///
/// Blocks are consumed strictly in order. Decorations with
/// [`Placement::EveryPage`] are stamped onto every resulting page.
pub fn lay_out(blocks: &[VisualBlock], styles: &StyleSheet, geometry: &PageGeometry) -> Vec<Page> {
    let mut paginator = Paginator::new(*geometry);

    for (index, block) in blocks.iter().enumerate() {
        for fragment in block_fragments(index, block, styles, geometry.frame_width()) {
            paginator.place(index, fragment);
        }
    }

    let mut pages = paginator.finish();
    PageTemplate::from_blocks(blocks).stamp(&mut pages, styles, geometry);
    pages
}

fn block_fragments(
    index: usize,
    block: &VisualBlock,
    styles: &StyleSheet,
    width: f32,
) -> Vec<Fragment> {
    match block {
        VisualBlock::Title(t) => {
            paragraph_fragments(&t.text, styles.paragraph(t.role), FragmentRole::Title, width)
        }
        VisualBlock::SectionHeading(t) => {
            paragraph_fragments(&t.text, styles.paragraph(t.role), FragmentRole::Heading, width)
        }
        VisualBlock::BodyParagraph(t) => {
            paragraph_fragments(&t.text, styles.paragraph(t.role), FragmentRole::BodyLine, width)
        }
        VisualBlock::MetadataTable(table) => table_fragments(table, &styles.table, width),
        VisualBlock::Image(image) => vec![image_fragment(index, image, styles.image_backdrop, width)],
        VisualBlock::Spacer(height) => vec![Fragment {
            discardable: true,
            ..Fragment::new(FragmentRole::Spacer, *height, Vec::new())
        }],
        VisualBlock::PageDecoration(deco) => match deco.placement {
            Placement::InFlow => vec![decoration::fragment(deco.kind, &styles.decoration, width)],
            Placement::EveryPage => Vec::new(),
        },
    }
}

/// Stacks fragments into page frames.
struct Paginator {
    geometry: PageGeometry,
    pages: Vec<Page>,
    /// Used height of the current frame
    cursor: f32,
    /// Trailing space owed by the previous fragment
    pending_gap: f32,
    at_top: bool,
}

impl Paginator {
    fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![Page::new(1)],
            cursor: 0.0,
            pending_gap: 0.0,
            at_top: true,
        }
    }

    fn fits(&self, height: f32) -> bool {
        self.cursor + height <= self.geometry.frame_height() + FIT_EPSILON
    }

    fn break_page(&mut self) {
        let number = self.pages.len() + 1;
        self.pages.push(Page::new(number));
        self.cursor = 0.0;
        self.pending_gap = 0.0;
        self.at_top = true;
    }

    fn place(&mut self, block: usize, fragment: Fragment) {
        if fragment.discardable {
            if self.at_top {
                return;
            }
            // The next fragment's own fit check decides on a page break
            let needed = self.pending_gap + fragment.height;
            if !self.fits(needed) {
                return;
            }
            self.push(block, self.pending_gap, fragment);
            return;
        }

        let mut gap = if self.at_top {
            0.0
        } else {
            self.pending_gap + fragment.gap_before
        };
        if !self.at_top && !self.fits(gap + fragment.height) {
            self.break_page();
            gap = 0.0;
        }
        self.push(block, gap, fragment);
    }

    fn push(&mut self, block: usize, gap: f32, fragment: Fragment) {
        let y = self.geometry.frame_top() + self.cursor + gap;
        self.cursor += gap + fragment.height;
        self.pending_gap = fragment.gap_after;
        self.at_top = false;

        if let Some(page) = self.pages.last_mut() {
            page.items.push(Placed {
                x: self.geometry.frame_left(),
                y,
                block,
                fragment,
            });
        }
    }

    fn finish(self) -> Vec<Page> {
        self.pages
    }
}

/// Greedy word wrap.
///
/// Runs of whitespace collapse to a single space. Words wider than
/// `max_width` are broken between characters.
pub fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let space = font.text_width(" ", size);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_width = 0.0;

    for word in text.split_whitespace() {
        let word_width = font.text_width(word, size);

        if line.is_empty() {
            if word_width <= max_width + FIT_EPSILON {
                line.push_str(word);
                line_width = word_width;
                continue;
            }
        } else if line_width + space + word_width <= max_width + FIT_EPSILON {
            line.push(' ');
            line.push_str(word);
            line_width += space + word_width;
            continue;
        } else {
            lines.push(std::mem::take(&mut line));
            line_width = 0.0;
            if word_width <= max_width + FIT_EPSILON {
                line.push_str(word);
                line_width = word_width;
                continue;
            }
        }

        let mut pieces = break_word(word, font, size, max_width);
        if let Some(last) = pieces.pop() {
            lines.extend(pieces);
            line_width = font.text_width(&last, size);
            line = last;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn break_word(word: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut width = 0.0;

    for c in word.chars() {
        let char_width = f32::from(font.char_width(c)) * size / 1000.0;
        if !piece.is_empty() && width + char_width > max_width + FIT_EPSILON {
            pieces.push(std::mem::take(&mut piece));
            width = 0.0;
        }
        piece.push(c);
        width += char_width;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

fn paragraph_fragments(
    text: &str,
    style: &ParagraphStyle,
    role: FragmentRole,
    width: f32,
) -> Vec<Fragment> {
    let lines = wrap_text(text, style.font, style.font_size, width);
    let last = lines.len().saturating_sub(1);
    let baseline = baseline_offset(style.font_size, style.leading);

    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let line_width = style.font.text_width(&line, style.font_size);
            let x = match style.alignment {
                Alignment::Left => 0.0,
                Alignment::Center => (width - line_width) / 2.0,
                Alignment::Right => width - line_width,
            };
            let op = DrawOp::Text {
                x: x.max(0.0),
                baseline,
                font: style.font,
                size: style.font_size,
                color: style.color,
                text: line,
            };
            Fragment {
                gap_before: if i == 0 { style.space_before } else { 0.0 },
                gap_after: if i == last { style.space_after } else { 0.0 },
                ..Fragment::new(role, style.leading, vec![op])
            }
        })
        .collect()
}

/// Text and look of one table row.
struct RowSpec<'a> {
    cells: [&'a str; 2],
    font: Font,
    size: f32,
    color: Color,
    backgrounds: [Option<Color>; 2],
    bottom_padding: f32,
}

fn table_fragments(table: &MetadataTable, style: &TableStyle, frame_width: f32) -> Vec<Fragment> {
    let offset = ((frame_width - table.width()) / 2.0).max(0.0);

    let header = RowSpec {
        cells: [table.header.as_str(), ""],
        font: style.header_font,
        size: style.header_font_size,
        color: style.header_text_color,
        backgrounds: [Some(style.header_background), Some(style.header_background)],
        bottom_padding: style.header_bottom_padding,
    };

    let mut fragments = vec![table_row(
        &header,
        FragmentRole::TableHeader,
        table,
        style,
        offset,
    )];

    for (i, (label, value)) in table.rows.iter().enumerate() {
        let row = RowSpec {
            cells: [label.as_str(), value.as_str()],
            font: style.body_font,
            size: style.body_font_size,
            color: style.body_text_color,
            backgrounds: [Some(style.label_background), None],
            bottom_padding: style.padding.bottom,
        };
        fragments.push(table_row(&row, FragmentRole::TableRow(i), table, style, offset));
    }

    fragments
}

fn table_row(
    row: &RowSpec<'_>,
    role: FragmentRole,
    table: &MetadataTable,
    style: &TableStyle,
    offset: f32,
) -> Fragment {
    let pad = style.padding;
    let leading = row.size * style.line_spacing;
    let baseline = baseline_offset(row.size, leading);

    let wrapped: Vec<Vec<String>> = row
        .cells
        .iter()
        .zip(table.column_widths.iter())
        .map(|(text, col_width)| {
            let inner = (col_width - pad.left - pad.right).max(1.0);
            let lines = wrap_text(text, row.font, row.size, inner);
            if lines.is_empty() {
                vec![String::new()]
            } else {
                lines
            }
        })
        .collect();

    let line_count = wrapped.iter().map(Vec::len).max().unwrap_or(1);
    let height = pad.top + line_count as f32 * leading + row.bottom_padding;

    let mut ops = Vec::new();
    let mut col_x = offset;
    let grid = Stroke {
        color: style.grid_color,
        width: style.grid_width,
    };

    for (col, lines) in wrapped.into_iter().enumerate() {
        let col_width = table.column_widths[col];

        if let Some(fill) = row.backgrounds[col] {
            ops.push(DrawOp::Rect {
                x: col_x,
                y: 0.0,
                width: col_width,
                height,
                fill: Some(fill),
                stroke: None,
            });
        }

        for (j, line) in lines.into_iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            ops.push(DrawOp::Text {
                x: col_x + pad.left,
                baseline: pad.top + j as f32 * leading + baseline,
                font: row.font,
                size: row.size,
                color: row.color,
                text: line,
            });
        }

        if grid.width > 0.0 {
            ops.push(DrawOp::Rect {
                x: col_x,
                y: 0.0,
                width: col_width,
                height,
                fill: None,
                stroke: Some(grid),
            });
        }

        col_x += col_width;
    }

    Fragment::new(role, height, ops)
}

fn image_fragment(index: usize, image: &ImageBlock, backdrop: Color, frame_width: f32) -> Fragment {
    let box_x = ((frame_width - image.display_width) / 2.0).max(0.0);
    let (width, height) = image.fitted_size();

    let ops = vec![
        DrawOp::Rect {
            x: box_x,
            y: 0.0,
            width: image.display_width,
            height: image.display_height,
            fill: Some(backdrop),
            stroke: None,
        },
        DrawOp::Image {
            x: box_x + (image.display_width - width) / 2.0,
            y: (image.display_height - height) / 2.0,
            width,
            height,
            block: index,
        },
    ];

    Fragment::new(FragmentRole::Image, image.display_height, ops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Decoration;

    fn styles() -> StyleSheet {
        StyleSheet::security_report()
    }

    #[test]
    fn test_a4_frame() {
        let geometry = PageGeometry::a4();
        assert!((geometry.frame_width() - 451.2756).abs() < 0.001);
        assert!((geometry.frame_height() - 697.8898).abs() < 0.001);
        assert_eq!(geometry.frame_left(), 72.0);
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "The subject approaches the loading dock, pauses near the camera and \
                    then leaves through the north gate without interacting with staff.";
        let lines = wrap_text(text, Font::Helvetica, 11.0, 200.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(Font::Helvetica.text_width(line, 11.0) <= 200.0 + FIT_EPSILON);
        }
        assert_eq!(lines.join(" "), text.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn test_wrap_breaks_long_words() {
        let word = "A".repeat(200);
        let lines = wrap_text(&format!("x {word} y"), Font::Helvetica, 10.0, 100.0);
        assert_eq!(lines.first().map(String::as_str), Some("x"));
        assert_eq!(lines.concat().replace(' ', ""), format!("x{word}y"));
        for line in &lines {
            assert!(Font::Helvetica.text_width(line, 10.0) <= 100.0 + FIT_EPSILON);
        }
    }

    #[test]
    fn test_wrap_empty_text() {
        assert!(wrap_text("   ", Font::Helvetica, 10.0, 100.0).is_empty());
    }

    #[test]
    fn test_single_block_single_page() {
        let blocks = vec![VisualBlock::body("Short finding.")];
        let pages = lay_out(&blocks, &styles(), &PageGeometry::a4());
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].text_runs(), vec!["Short finding."]);
        // Leading space is dropped at the top of the frame
        assert_eq!(pages[0].items[0].y, 72.0);
    }

    #[test]
    fn test_empty_document_has_one_page() {
        let pages = lay_out(&[], &styles(), &PageGeometry::a4());
        assert_eq!(pages.len(), 1);
        assert!(pages[0].items.is_empty());
    }

    #[test]
    fn test_overflow_flows_to_new_pages() {
        let blocks: Vec<VisualBlock> = (0..80)
            .map(|i| VisualBlock::body(format!("Observation {i}")))
            .collect();
        let geometry = PageGeometry::a4();
        let pages = lay_out(&blocks, &styles(), &geometry);

        assert!(pages.len() > 1);
        let bottom = geometry.height - geometry.margin;
        for page in &pages {
            for item in &page.items {
                assert!(item.y + item.fragment.height <= bottom + FIT_EPSILON);
            }
        }

        // Order is preserved across pages
        let runs: Vec<String> = pages.iter().flat_map(Page::text_runs).collect();
        let expected: Vec<String> = (0..80).map(|i| format!("Observation {i}")).collect();
        assert_eq!(runs, expected);
    }

    #[test]
    fn test_spacer_dropped_at_page_top() {
        let geometry = PageGeometry::a4();
        let blocks = vec![VisualBlock::spacer(30.0), VisualBlock::body("x")];
        let pages = lay_out(&blocks, &styles(), &geometry);
        assert_eq!(pages[0].items.len(), 1);
        assert_eq!(pages[0].items[0].y, geometry.frame_top());
    }

    #[test]
    fn test_spacer_that_does_not_fit_is_dropped() {
        let geometry = PageGeometry::a4();
        let blocks = vec![
            VisualBlock::body("first"),
            VisualBlock::spacer(geometry.frame_height()),
            VisualBlock::body("second"),
        ];
        let pages = lay_out(&blocks, &styles(), &geometry);
        assert_eq!(pages.len(), 1);
        let blocks_on_page: Vec<usize> = pages[0].items.iter().map(|p| p.block).collect();
        assert_eq!(blocks_on_page, vec![0, 2]);
    }

    #[test]
    fn test_footer_stamped_on_every_page() {
        let mut blocks: Vec<VisualBlock> = (0..120)
            .map(|i| VisualBlock::body(format!("Line {i}")))
            .collect();
        blocks.push(VisualBlock::PageDecoration(Decoration::footer()));

        let pages = lay_out(&blocks, &styles(), &PageGeometry::a4());
        assert!(pages.len() >= 3);
        for (i, page) in pages.iter().enumerate() {
            assert_eq!(page.number, i + 1);
            assert_eq!(page.footer_label(), Some(format!("Page {}", i + 1)));
        }
    }

    #[test]
    fn test_in_flow_header_only_once() {
        let mut blocks = vec![VisualBlock::PageDecoration(Decoration::header())];
        blocks.extend((0..120).map(|i| VisualBlock::body(format!("Line {i}"))));

        let pages = lay_out(&blocks, &styles(), &PageGeometry::a4());
        let header = FragmentRole::Decoration(DecorationKind::Header);
        assert_eq!(pages[0].items_with_role(header).count(), 1);
        for page in &pages[1..] {
            assert_eq!(page.items_with_role(header).count(), 0);
        }
    }

    #[test]
    fn test_table_rows_and_centering() {
        let table = MetadataTable {
            header: "REPORT DETAILS".to_string(),
            rows: vec![
                ("Report ID:".to_string(), "abc".to_string()),
                ("Priority Level:".to_string(), "HIGH".to_string()),
            ],
            column_widths: [180.0, 270.0],
        };
        let fragments = table_fragments(&table, &styles().table, 451.2756);
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[0].role, FragmentRole::TableHeader);
        assert_eq!(fragments[2].role, FragmentRole::TableRow(1));

        // Header: 8 top + 12 * 1.2 + 12 bottom
        assert!((fragments[0].height - 34.4).abs() < 0.001);
        // Body rows: 8 + 10 * 1.2 + 8
        assert!((fragments[1].height - 28.0).abs() < 0.001);

        let first_x = fragments[1]
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Rect { x, .. } => Some(*x),
                _ => None,
            })
            .unwrap();
        assert!((first_x - 0.6378).abs() < 0.001);
    }

    #[test]
    fn test_long_table_value_wraps() {
        let table = MetadataTable {
            header: "REPORT DETAILS".to_string(),
            rows: vec![("Report ID:".to_string(), "segment ".repeat(40))],
            column_widths: [180.0, 270.0],
        };
        let fragments = table_fragments(&table, &styles().table, 451.2756);
        assert!(fragments[1].height > 28.0);
    }

    #[test]
    fn test_image_is_centered_in_box() {
        let image = ImageBlock {
            jpeg: Vec::new(),
            pixel_width: 640,
            pixel_height: 480,
            display_width: 432.0,
            display_height: 288.0,
        };
        let fragment = image_fragment(4, &image, Color::BLACK, 451.2756);
        assert_eq!(fragment.height, 288.0);
        match &fragment.ops[1] {
            DrawOp::Image {
                x,
                y,
                width,
                height,
                block,
            } => {
                assert_eq!(*block, 4);
                assert!((*height - 288.0).abs() < 0.001);
                assert!((*width - 384.0).abs() < 0.001);
                assert_eq!(*y, 0.0);
                // box offset 9.6378 + (432 - 384) / 2
                assert!((*x - 33.6378).abs() < 0.001);
            }
            other => panic!("unexpected op {other:?}"),
        }
    }
}
