//! Serialization of laid-out pages to PDF.

use std::io::Write;

use chrono::{Datelike, NaiveDateTime, Timelike};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use pdf_writer::{Content, Date, Filter, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::block::VisualBlock;
use crate::decoration::page_label;
use crate::error::{RenderError, RenderResult};
use crate::fonts::{encode_win_ansi, Font};
use crate::layout::{DrawOp, Page, PageGeometry, Placed, Stroke};
use crate::style::Color;

const PRODUCER: &str = concat!("vsec-report ", env!("CARGO_PKG_VERSION"));

/// Document information dictionary entries.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    pub title: String,
    pub subject: String,
    pub created: NaiveDateTime,
}

/// Sequential object id allocator.
struct RefAlloc(i32);

impl RefAlloc {
    fn next(&mut self) -> Ref {
        self.0 += 1;
        Ref::new(self.0)
    }
}

/// Encode pages into a complete PDF file.
pub fn write_pdf(
    pages: &[Page],
    blocks: &[VisualBlock],
    geometry: &PageGeometry,
    info: &DocumentInfo,
) -> RenderResult<Vec<u8>> {
    let mut pdf = Pdf::new();
    let mut refs = RefAlloc(0);

    let catalog_ref = refs.next();
    let page_tree_ref = refs.next();
    let info_ref = refs.next();
    let font_refs: Vec<(Font, Ref)> = Font::ALL.iter().map(|f| (*f, refs.next())).collect();

    pdf.catalog(catalog_ref).pages(page_tree_ref);

    for (font, font_ref) in &font_refs {
        pdf.type1_font(*font_ref)
            .base_font(Name(font.base_name().as_bytes()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    // One XObject per image block, shared by every page that shows it
    let mut images: Vec<(usize, Ref, String)> = Vec::new();
    for (index, block) in blocks.iter().enumerate() {
        if let VisualBlock::Image(image) = block {
            let image_ref = refs.next();
            let mut xobject = pdf.image_xobject(image_ref, &image.jpeg);
            xobject.filter(Filter::DctDecode);
            xobject.width(to_i32(image.pixel_width)?);
            xobject.height(to_i32(image.pixel_height)?);
            xobject.color_space().device_rgb();
            xobject.bits_per_component(8);
            xobject.finish();
            images.push((index, image_ref, format!("Im{}", images.len() + 1)));
        }
    }

    let mut page_refs = Vec::with_capacity(pages.len());
    for page in pages {
        let page_ref = refs.next();
        let content_ref = refs.next();
        page_refs.push(page_ref);

        let used = page.image_blocks();
        let mut page_writer = pdf.page(page_ref);
        page_writer
            .media_box(Rect::new(0.0, 0.0, geometry.width, geometry.height))
            .parent(page_tree_ref)
            .contents(content_ref);

        let mut resources = page_writer.resources();
        {
            let mut fonts = resources.fonts();
            for (font, font_ref) in &font_refs {
                fonts.pair(Name(font.resource_name().as_bytes()), *font_ref);
            }
        }
        {
            let mut xobjects = resources.x_objects();
            for (block, image_ref, name) in &images {
                if used.contains(block) {
                    xobjects.pair(Name(name.as_bytes()), *image_ref);
                }
            }
        }
        resources.finish();
        page_writer.finish();

        let content = page_content(page, geometry, &images);
        let compressed = deflate(&content)?;
        pdf.stream(content_ref, &compressed)
            .filter(Filter::FlateDecode);
    }

    let page_count = to_i32(pages.len())?;
    pdf.pages(page_tree_ref).kids(page_refs).count(page_count);

    pdf.document_info(info_ref)
        .title(TextStr(&info.title))
        .subject(TextStr(&info.subject))
        .producer(TextStr(PRODUCER))
        .creation_date(pdf_date(&info.created));

    Ok(pdf.finish())
}

fn page_content(page: &Page, geometry: &PageGeometry, images: &[(usize, Ref, String)]) -> Vec<u8> {
    let mut content = Content::new();
    for placed in &page.items {
        for op in &placed.fragment.ops {
            draw(&mut content, placed, op, page.number, geometry, images);
        }
    }
    content.finish()
}

fn draw(
    content: &mut Content,
    placed: &Placed,
    op: &DrawOp,
    page_number: usize,
    geometry: &PageGeometry,
    images: &[(usize, Ref, String)],
) {
    // Layout works top-down, PDF user space bottom-up
    let to_x = |x: f32| placed.x + x;
    let to_y = |y: f32| geometry.height - (placed.y + y);

    match op {
        DrawOp::Text {
            x,
            baseline,
            font,
            size,
            color,
            text,
        } => show_text(content, *font, *size, *color, to_x(*x), to_y(*baseline), text),
        DrawOp::PageNumber {
            right,
            baseline,
            font,
            size,
            color,
        } => {
            let label = page_label(page_number);
            let x = to_x(*right) - font.text_width(&label, *size);
            show_text(content, *font, *size, *color, x, to_y(*baseline), &label);
        }
        DrawOp::Line { from, to, stroke } => {
            set_stroke(content, stroke);
            content.move_to(to_x(from.0), to_y(from.1));
            content.line_to(to_x(to.0), to_y(to.1));
            content.stroke();
        }
        DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        } => {
            if let Some(color) = fill {
                let [r, g, b] = color.to_unit();
                content.set_fill_rgb(r, g, b);
            }
            if let Some(stroke) = stroke {
                set_stroke(content, stroke);
            }
            content.rect(to_x(*x), to_y(*y + *height), *width, *height);
            match (fill, stroke) {
                (Some(_), Some(_)) => content.fill_nonzero_and_stroke(),
                (Some(_), None) => content.fill_nonzero(),
                (None, Some(_)) => content.stroke(),
                (None, None) => content.end_path(),
            };
        }
        DrawOp::Image {
            x,
            y,
            width,
            height,
            block,
        } => {
            if let Some((_, _, name)) = images.iter().find(|(b, _, _)| b == block) {
                content.save_state();
                content.transform([*width, 0.0, 0.0, *height, to_x(*x), to_y(*y + *height)]);
                content.x_object(Name(name.as_bytes()));
                content.restore_state();
            }
        }
    }
}

fn show_text(
    content: &mut Content,
    font: Font,
    size: f32,
    color: Color,
    x: f32,
    y: f32,
    text: &str,
) {
    let [r, g, b] = color.to_unit();
    let encoded = encode_win_ansi(text);
    content.begin_text();
    content.set_font(Name(font.resource_name().as_bytes()), size);
    content.set_fill_rgb(r, g, b);
    content.next_line(x, y);
    content.show(Str(&encoded));
    content.end_text();
}

fn set_stroke(content: &mut Content, stroke: &Stroke) {
    let [r, g, b] = stroke.color.to_unit();
    content.set_stroke_rgb(r, g, b);
    content.set_line_width(stroke.width);
}

fn deflate(data: &[u8]) -> RenderResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| RenderError::encode(format!("content stream compression: {e}")))?;
    encoder
        .finish()
        .map_err(|e| RenderError::encode(format!("content stream compression: {e}")))
}

fn pdf_date(ts: &NaiveDateTime) -> Date {
    let year = u16::try_from(ts.year()).unwrap_or(0);
    Date::new(year)
        .month(ts.month() as u8)
        .day(ts.day() as u8)
        .hour(ts.hour() as u8)
        .minute(ts.minute() as u8)
        .second(ts.second() as u8)
}

fn to_i32<T: TryInto<i32> + Copy + std::fmt::Display>(value: T) -> RenderResult<i32> {
    value
        .try_into()
        .map_err(|_| RenderError::encode(format!("value {value} does not fit a PDF integer")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Decoration;
    use crate::layout::lay_out;
    use crate::style::StyleSheet;
    use chrono::NaiveDate;

    fn info() -> DocumentInfo {
        DocumentInfo {
            title: "SECURITY ANALYSIS REPORT".to_string(),
            subject: "Report abc123".to_string(),
            created: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(12, 30, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_writes_pdf_header_and_trailer() {
        let blocks = vec![
            VisualBlock::title("SECURITY ANALYSIS REPORT"),
            VisualBlock::body("Nothing unusual observed."),
            VisualBlock::PageDecoration(Decoration::footer()),
        ];
        let geometry = PageGeometry::a4();
        let pages = lay_out(&blocks, &StyleSheet::default(), &geometry);
        let bytes = write_pdf(&pages, &blocks, &geometry, &info()).unwrap();

        assert!(bytes.starts_with(b"%PDF-"));
        let tail = String::from_utf8_lossy(&bytes[bytes.len().saturating_sub(64)..]).to_string();
        assert!(tail.contains("%%EOF"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Helvetica-Bold"));
        assert!(text.contains("/WinAnsiEncoding"));
        assert!(text.contains("/FlateDecode"));
    }

    #[test]
    fn test_content_resolves_page_numbers() {
        let mut blocks: Vec<VisualBlock> = (0..90)
            .map(|i| VisualBlock::body(format!("Entry {i}")))
            .collect();
        blocks.push(VisualBlock::PageDecoration(Decoration::footer()));
        let geometry = PageGeometry::a4();
        let pages = lay_out(&blocks, &StyleSheet::default(), &geometry);
        assert!(pages.len() > 1);

        let content = page_content(&pages[1], &geometry, &[]);
        let text = String::from_utf8_lossy(&content);
        assert!(text.contains("(Page 2) Tj"));
        assert!(!text.contains("(Page 1) Tj"));
    }

    #[test]
    fn test_pdf_date_fields() {
        let date = pdf_date(&info().created);
        let mut pdf = Pdf::new();
        pdf.document_info(Ref::new(1)).creation_date(date);
        let bytes = pdf.finish();
        assert!(String::from_utf8_lossy(&bytes).contains("D:20240501123000"));
    }

    #[test]
    fn test_deflate_round_trip() {
        use flate2::read::ZlibDecoder;
        use std::io::Read;

        let compressed = deflate(b"BT /F1 11 Tf ET").unwrap();
        let mut out = Vec::new();
        ZlibDecoder::new(&compressed[..]).read_to_end(&mut out).unwrap();
        assert_eq!(out, b"BT /F1 11 Tf ET");
    }
}
