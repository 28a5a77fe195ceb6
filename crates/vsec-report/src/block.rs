//! Visual blocks: the renderable units of a report.
//!
//! Blocks are produced in a fixed order and laid out in that order.

use std::fmt;

use crate::style::StyleRole;

/// Discriminant of a [`VisualBlock`], handy for assertions and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Title,
    MetadataTable,
    Image,
    SectionHeading,
    BodyParagraph,
    Spacer,
    PageDecoration,
}

/// Text plus a reference to the style it is set in.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub role: StyleRole,
}

/// Two-column table: a header band followed by label/value rows.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataTable {
    pub header: String,
    pub rows: Vec<(String, String)>,
    /// Absolute column widths in points
    pub column_widths: [f32; 2],
}

impl MetadataTable {
    pub fn width(&self) -> f32 {
        self.column_widths.iter().sum()
    }
}

/// A JPEG image shown inside a fixed display box.
#[derive(Clone, PartialEq)]
pub struct ImageBlock {
    /// Baseline JPEG, embedded as-is
    pub jpeg: Vec<u8>,
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// Display box in points; the image is fitted and centered inside it
    pub display_width: f32,
    pub display_height: f32,
}

impl ImageBlock {
    /// Size of the image once fitted into the display box.
    pub fn fitted_size(&self) -> (f32, f32) {
        if self.pixel_width == 0 || self.pixel_height == 0 {
            return (0.0, 0.0);
        }
        let scale = (self.display_width / self.pixel_width as f32)
            .min(self.display_height / self.pixel_height as f32);
        (
            self.pixel_width as f32 * scale,
            self.pixel_height as f32 * scale,
        )
    }
}

impl fmt::Debug for ImageBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBlock")
            .field("jpeg_bytes", &self.jpeg.len())
            .field("pixel_width", &self.pixel_width)
            .field("pixel_height", &self.pixel_height)
            .field("display_width", &self.display_width)
            .field("display_height", &self.display_height)
            .finish()
    }
}

/// Which decoration a block draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecorationKind {
    /// Rule with a "SECURE" badge above it
    Header,
    /// Lighter rule with a right-aligned page number
    Footer,
}

/// Where a decoration appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Drawn once, at its position in the block flow
    InFlow,
    /// Stamped on every physical page by the page template
    EveryPage,
}

/// Page decoration block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoration {
    pub kind: DecorationKind,
    pub placement: Placement,
}

impl Decoration {
    /// Header decoration, drawn where it is inserted.
    pub fn header() -> Self {
        Self {
            kind: DecorationKind::Header,
            placement: Placement::InFlow,
        }
    }

    /// Footer decoration, repeated on every page.
    pub fn footer() -> Self {
        Self {
            kind: DecorationKind::Footer,
            placement: Placement::EveryPage,
        }
    }
}

/// One renderable unit of report content.
#[derive(Debug, Clone, PartialEq)]
pub enum VisualBlock {
    Title(TextBlock),
    MetadataTable(MetadataTable),
    Image(ImageBlock),
    SectionHeading(TextBlock),
    BodyParagraph(TextBlock),
    Spacer(f32),
    PageDecoration(Decoration),
}

impl VisualBlock {
    pub fn title(text: impl Into<String>) -> Self {
        Self::Title(TextBlock {
            text: text.into(),
            role: StyleRole::Title,
        })
    }

    pub fn heading(text: impl Into<String>) -> Self {
        Self::SectionHeading(TextBlock {
            text: text.into(),
            role: StyleRole::SectionHeading,
        })
    }

    pub fn body(text: impl Into<String>) -> Self {
        Self::BodyParagraph(TextBlock {
            text: text.into(),
            role: StyleRole::Body,
        })
    }

    pub fn spacer(height: f32) -> Self {
        Self::Spacer(height)
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Title(_) => BlockKind::Title,
            Self::MetadataTable(_) => BlockKind::MetadataTable,
            Self::Image(_) => BlockKind::Image,
            Self::SectionHeading(_) => BlockKind::SectionHeading,
            Self::BodyParagraph(_) => BlockKind::BodyParagraph,
            Self::Spacer(_) => BlockKind::Spacer,
            Self::PageDecoration(_) => BlockKind::PageDecoration,
        }
    }

    /// Text of text-bearing blocks.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Title(t) | Self::SectionHeading(t) | Self::BodyParagraph(t) => Some(&t.text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_and_text() {
        assert_eq!(VisualBlock::title("T").kind(), BlockKind::Title);
        assert_eq!(VisualBlock::heading("H").text(), Some("H"));
        assert_eq!(VisualBlock::spacer(20.0).text(), None);
        assert_eq!(
            VisualBlock::PageDecoration(Decoration::footer()).kind(),
            BlockKind::PageDecoration
        );
    }

    #[test]
    fn test_decoration_placement() {
        assert_eq!(Decoration::header().placement, Placement::InFlow);
        assert_eq!(Decoration::footer().placement, Placement::EveryPage);
    }

    #[test]
    fn test_fitted_size_letterboxes() {
        let block = ImageBlock {
            jpeg: Vec::new(),
            pixel_width: 1920,
            pixel_height: 1080,
            display_width: 432.0,
            display_height: 288.0,
        };
        let (w, h) = block.fitted_size();
        assert!((w - 432.0).abs() < 0.01);
        assert!((h - 243.0).abs() < 0.01);

        let portrait = ImageBlock {
            pixel_width: 480,
            pixel_height: 640,
            ..block
        };
        let (w, h) = portrait.fitted_size();
        assert!((h - 288.0).abs() < 0.01);
        assert!((w - 216.0).abs() < 0.01);
    }

    #[test]
    fn test_fitted_size_of_empty_frame() {
        let block = ImageBlock {
            jpeg: Vec::new(),
            pixel_width: 0,
            pixel_height: 240,
            display_width: 432.0,
            display_height: 288.0,
        };
        assert_eq!(block.fitted_size(), (0.0, 0.0));
    }

    #[test]
    fn test_image_debug_hides_bytes() {
        let block = ImageBlock {
            jpeg: vec![0xFF; 4096],
            pixel_width: 2,
            pixel_height: 2,
            display_width: 10.0,
            display_height: 10.0,
        };
        let debug = format!("{:?}", block);
        assert!(debug.contains("jpeg_bytes: 4096"));
    }
}
