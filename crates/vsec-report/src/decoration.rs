//! Header and footer decorations and the page template that repeats them.

use crate::block::{DecorationKind, Placement, VisualBlock};
use crate::layout::{DrawOp, Fragment, FragmentRole, Page, PageGeometry, Placed, Stroke};
use crate::style::{DecorationStyle, StyleSheet};

/// Footer text for a page.
pub fn page_label(number: usize) -> String {
    format!("Page {number}")
}

/// Build the fragment drawing a decoration across `width`.
pub fn fragment(kind: DecorationKind, style: &DecorationStyle, width: f32) -> Fragment {
    match kind {
        DecorationKind::Header => header_fragment(style, width),
        DecorationKind::Footer => footer_fragment(style, width),
    }
}

/// Badge on the left with a heavy rule underneath.
fn header_fragment(style: &DecorationStyle, width: f32) -> Fragment {
    let rule_y = style.badge_height + style.badge_gap + style.header_rule_width / 2.0;
    let ops = vec![
        DrawOp::Rect {
            x: 0.0,
            y: 0.0,
            width: style.badge_width,
            height: style.badge_height,
            fill: Some(style.color),
            stroke: None,
        },
        DrawOp::Text {
            x: style.badge_inset,
            baseline: style.badge_height - style.badge_inset,
            font: style.badge_font,
            size: style.badge_font_size,
            color: style.badge_text_color,
            text: vsec_models::SECURE_BADGE_LABEL.to_string(),
        },
        DrawOp::Line {
            from: (0.0, rule_y),
            to: (width, rule_y),
            stroke: Stroke {
                color: style.color,
                width: style.header_rule_width,
            },
        },
    ];

    Fragment {
        role: FragmentRole::Decoration(DecorationKind::Header),
        height: style.badge_height + style.badge_gap + style.header_rule_width,
        gap_before: 0.0,
        gap_after: 0.0,
        discardable: false,
        ops,
    }
}

/// Light rule with the page number right-aligned below it.
fn footer_fragment(style: &DecorationStyle, width: f32) -> Fragment {
    let baseline = (style.footer_rule_offset - style.footer_text_offset).max(0.0);
    let ops = vec![
        DrawOp::Line {
            from: (0.0, 0.0),
            to: (width, 0.0),
            stroke: Stroke {
                color: style.color,
                width: style.footer_rule_width,
            },
        },
        DrawOp::PageNumber {
            right: width,
            baseline,
            font: style.footer_font,
            size: style.footer_font_size,
            color: style.footer_text_color,
        },
    ];

    Fragment {
        role: FragmentRole::Decoration(DecorationKind::Footer),
        height: baseline + style.footer_font_size * 0.25,
        gap_before: 0.0,
        gap_after: 0.0,
        discardable: false,
        ops,
    }
}

/// Decorations repeated on every physical page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageTemplate {
    /// Originating block index and kind, in block order
    decorations: Vec<(usize, DecorationKind)>,
}

impl PageTemplate {
    /// Collect the page-level decorations of a block list.
    pub fn from_blocks(blocks: &[VisualBlock]) -> Self {
        let mut decorations: Vec<(usize, DecorationKind)> = Vec::new();
        for (index, block) in blocks.iter().enumerate() {
            if let VisualBlock::PageDecoration(deco) = block {
                let seen = decorations.iter().any(|(_, kind)| *kind == deco.kind);
                if deco.placement == Placement::EveryPage && !seen {
                    decorations.push((index, deco.kind));
                }
            }
        }
        Self { decorations }
    }

    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }

    /// Draw the template decorations onto each page, outside the content frame.
    pub fn stamp(&self, pages: &mut [Page], styles: &StyleSheet, geometry: &PageGeometry) {
        let style = &styles.decoration;
        for page in pages.iter_mut() {
            for &(block, kind) in &self.decorations {
                let fragment = fragment(kind, style, geometry.frame_width());
                let y = match kind {
                    DecorationKind::Footer => geometry.height - style.footer_rule_offset,
                    DecorationKind::Header => ((geometry.margin - fragment.height) / 2.0).max(0.0),
                };
                page.items.push(Placed {
                    x: geometry.frame_left(),
                    y,
                    block,
                    fragment,
                });
            }
        }
    }
}
