//! Immutable style sheet for report rendering.
//!
//! A [`StyleSheet`] is built once, validated when a composer is created and
//! then only ever read. It is cheap to share between composers through an
//! `Arc`.

use crate::error::{RenderError, RenderResult};
use crate::fonts::Font;

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb8(0xFF, 0xFF, 0xFF);
    pub const BLACK: Color = Color::rgb8(0x00, 0x00, 0x00);

    /// Color from 8-bit components.
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components scaled to `0.0..=1.0`.
    pub fn to_unit(self) -> [f32; 3] {
        [self.r, self.g, self.b].map(|c| f32::from(c) / 255.0)
    }
}

/// Primary brand blue.
pub const NAVY: Color = Color::rgb8(0x1B, 0x4F, 0x72);
/// Section heading blue.
pub const STEEL_BLUE: Color = Color::rgb8(0x28, 0x74, 0xA6);
/// Body text slate.
pub const SLATE: Color = Color::rgb8(0x2C, 0x3E, 0x50);
/// Label column background.
pub const MIST: Color = Color::rgb8(0xF8, 0xF9, 0xF9);
/// Table grid.
pub const SILVER: Color = Color::rgb8(0xBD, 0xC3, 0xC7);
/// Letterbox band behind the footage frame.
pub const CHARCOAL: Color = Color::rgb8(0x17, 0x20, 0x2A);

/// Horizontal alignment of text lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// Style roles used to look up paragraph styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleRole {
    Title,
    SectionHeading,
    Body,
}

/// Text style for paragraphs.
#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphStyle {
    pub name: &'static str,
    pub font: Font,
    pub font_size: f32,
    /// Distance between consecutive baselines
    pub leading: f32,
    pub color: Color,
    pub alignment: Alignment,
    /// Space above the paragraph, dropped at the top of a page
    pub space_before: f32,
    pub space_after: f32,
}

/// Cell padding in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

/// Style of the two-column metadata table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStyle {
    pub header_font: Font,
    pub header_font_size: f32,
    pub header_text_color: Color,
    pub header_background: Color,
    /// Bottom padding of the header band (overrides `padding.bottom`)
    pub header_bottom_padding: f32,
    pub body_font: Font,
    pub body_font_size: f32,
    pub body_text_color: Color,
    /// Background of the label column
    pub label_background: Color,
    pub grid_color: Color,
    pub grid_width: f32,
    pub padding: Padding,
    /// Leading as a multiple of the font size
    pub line_spacing: f32,
}

/// Style of the header and footer decorations.
#[derive(Debug, Clone, PartialEq)]
pub struct DecorationStyle {
    pub color: Color,
    pub header_rule_width: f32,
    pub badge_width: f32,
    pub badge_height: f32,
    /// Gap between the badge and the header rule
    pub badge_gap: f32,
    pub badge_font: Font,
    pub badge_font_size: f32,
    pub badge_text_color: Color,
    pub badge_inset: f32,
    pub footer_rule_width: f32,
    pub footer_font: Font,
    pub footer_font_size: f32,
    pub footer_text_color: Color,
    /// Distance from the bottom page edge to the footer rule
    pub footer_rule_offset: f32,
    /// Distance from the bottom page edge to the page-number baseline
    pub footer_text_offset: f32,
}

/// The complete, read-only set of report styles.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    pub title: ParagraphStyle,
    pub section: ParagraphStyle,
    pub body: ParagraphStyle,
    pub table: TableStyle,
    pub decoration: DecorationStyle,
    /// Fill behind a letterboxed image
    pub image_backdrop: Color,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::security_report()
    }
}

impl StyleSheet {
    /// The fixed security report look.
    pub fn security_report() -> Self {
        Self {
            title: ParagraphStyle {
                name: "CustomTitle",
                font: Font::HelveticaBold,
                font_size: 28.0,
                leading: 34.0,
                color: NAVY,
                alignment: Alignment::Center,
                space_before: 0.0,
                space_after: 30.0,
            },
            section: ParagraphStyle {
                name: "SectionTitle",
                font: Font::HelveticaBold,
                font_size: 18.0,
                leading: 22.0,
                color: STEEL_BLUE,
                alignment: Alignment::Left,
                space_before: 20.0,
                space_after: 20.0,
            },
            body: ParagraphStyle {
                name: "CustomBody",
                font: Font::Helvetica,
                font_size: 11.0,
                leading: 16.0,
                color: SLATE,
                alignment: Alignment::Left,
                space_before: 6.0,
                space_after: 6.0,
            },
            table: TableStyle {
                header_font: Font::HelveticaBold,
                header_font_size: 12.0,
                header_text_color: Color::WHITE,
                header_background: NAVY,
                header_bottom_padding: 12.0,
                body_font: Font::Helvetica,
                body_font_size: 10.0,
                body_text_color: Color::BLACK,
                label_background: MIST,
                grid_color: SILVER,
                grid_width: 0.5,
                padding: Padding {
                    top: 8.0,
                    bottom: 8.0,
                    left: 12.0,
                    right: 12.0,
                },
                line_spacing: 1.2,
            },
            decoration: DecorationStyle {
                color: NAVY,
                header_rule_width: 2.0,
                badge_width: 50.0,
                badge_height: 20.0,
                badge_gap: 5.0,
                badge_font: Font::HelveticaBold,
                badge_font_size: 8.0,
                badge_text_color: Color::WHITE,
                badge_inset: 5.0,
                footer_rule_width: 1.0,
                footer_font: Font::Helvetica,
                footer_font_size: 8.0,
                footer_text_color: Color::BLACK,
                footer_rule_offset: 46.0,
                footer_text_offset: 34.0,
            },
            image_backdrop: CHARCOAL,
        }
    }

    /// Paragraph style for a role.
    pub fn paragraph(&self, role: StyleRole) -> &ParagraphStyle {
        match role {
            StyleRole::Title => &self.title,
            StyleRole::SectionHeading => &self.section,
            StyleRole::Body => &self.body,
        }
    }

    /// Reject styles that cannot be laid out.
    pub fn validate(&self) -> RenderResult<()> {
        for style in [&self.title, &self.section, &self.body] {
            check_positive(style.name, "font_size", style.font_size)?;
            check_non_negative(style.name, "space_before", style.space_before)?;
            check_non_negative(style.name, "space_after", style.space_after)?;
            if !(style.leading.is_finite() && style.leading >= style.font_size) {
                return Err(RenderError::style(format!(
                    "{}: leading {} is smaller than font size {}",
                    style.name, style.leading, style.font_size
                )));
            }
        }

        let table = &self.table;
        check_positive("table", "header_font_size", table.header_font_size)?;
        check_positive("table", "body_font_size", table.body_font_size)?;
        check_non_negative("table", "grid_width", table.grid_width)?;
        check_non_negative("table", "header_bottom_padding", table.header_bottom_padding)?;
        for (field, value) in [
            ("padding.top", table.padding.top),
            ("padding.bottom", table.padding.bottom),
            ("padding.left", table.padding.left),
            ("padding.right", table.padding.right),
        ] {
            check_non_negative("table", field, value)?;
        }
        if !(table.line_spacing.is_finite() && table.line_spacing >= 1.0) {
            return Err(RenderError::style("table: line_spacing must be at least 1.0"));
        }

        let deco = &self.decoration;
        check_positive("decoration", "badge_width", deco.badge_width)?;
        check_positive("decoration", "badge_height", deco.badge_height)?;
        check_positive("decoration", "badge_font_size", deco.badge_font_size)?;
        check_positive("decoration", "footer_font_size", deco.footer_font_size)?;
        check_non_negative("decoration", "header_rule_width", deco.header_rule_width)?;
        check_non_negative("decoration", "footer_rule_width", deco.footer_rule_width)?;
        check_non_negative("decoration", "footer_rule_offset", deco.footer_rule_offset)?;
        check_non_negative("decoration", "footer_text_offset", deco.footer_text_offset)?;

        Ok(())
    }
}

fn check_positive(owner: &str, field: &str, value: f32) -> RenderResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(RenderError::style(format!("{owner}: {field} must be positive, got {value}")))
    }
}

fn check_non_negative(owner: &str, field: &str, value: f32) -> RenderResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RenderError::style(format!("{owner}: {field} must not be negative, got {value}")))
    }
}
