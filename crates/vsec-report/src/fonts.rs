//! Standard Type1 font metrics and WinAnsi text encoding.
//!
//! Reports only use the built-in Helvetica faces, so no font program is
//! embedded; widths come from the standard AFM metrics.

/// Ascender of the Helvetica faces, in font units per 1000.
pub const HELVETICA_ASCENT: f32 = 718.0;
/// Descender of the Helvetica faces, in font units per 1000 (absolute).
pub const HELVETICA_DESCENT: f32 = 207.0;

/// Width used for characters outside the metric tables.
const FALLBACK_WIDTH: u16 = 556;

/// Advance widths of Helvetica for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Advance widths of Helvetica-Bold for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Built-in font faces used by the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

impl Font {
    pub const ALL: [Font; 2] = [Font::Helvetica, Font::HelveticaBold];

    /// PostScript name of the base font.
    pub fn base_name(&self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Name of the font in a page's resource dictionary.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
        }
    }

    /// Advance width of one character in 1/1000 em.
    pub fn char_width(&self, c: char) -> u16 {
        let table = match self {
            Font::Helvetica => &HELVETICA_WIDTHS,
            Font::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        };
        match c {
            ' '..='~' => table[c as usize - 32],
            '\u{2014}' | '\u{2026}' | '\u{2030}' => 1000,
            '\u{2018}' | '\u{2019}' | '\u{201A}' => match self {
                Font::Helvetica => 222,
                Font::HelveticaBold => 278,
            },
            '\u{2022}' => 350,
            '\u{00A0}' => 278,
            _ => match win_ansi_byte(c) {
                Some(_) => FALLBACK_WIDTH,
                // Drawn as '?'
                None => table['?' as usize - 32],
            },
        }
    }

    /// Width of `text` set at `size` points.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.char_width(c))).sum();
        units as f32 * size / 1000.0
    }
}

/// Offset from the top of a line box to the baseline.
///
/// The glyph box (ascender to descender) is centered inside the leading.
pub fn baseline_offset(size: f32, leading: f32) -> f32 {
    let glyph_height = (HELVETICA_ASCENT + HELVETICA_DESCENT) * size / 1000.0;
    (leading - glyph_height) / 2.0 + HELVETICA_ASCENT * size / 1000.0
}

/// Encode text for a WinAnsiEncoding font.
///
/// Characters without a WinAnsi code point become `?`; control characters
/// become spaces.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            if c.is_control() {
                b' '
            } else {
                win_ansi_byte(c).unwrap_or(b'?')
            }
        })
        .collect()
}

fn win_ansi_byte(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => match c {
            '\u{20AC}' => Some(0x80),
            '\u{201A}' => Some(0x82),
            '\u{0192}' => Some(0x83),
            '\u{201E}' => Some(0x84),
            '\u{2026}' => Some(0x85),
            '\u{2020}' => Some(0x86),
            '\u{2021}' => Some(0x87),
            '\u{02C6}' => Some(0x88),
            '\u{2030}' => Some(0x89),
            '\u{0160}' => Some(0x8A),
            '\u{2039}' => Some(0x8B),
            '\u{0152}' => Some(0x8C),
            '\u{017D}' => Some(0x8E),
            '\u{2018}' => Some(0x91),
            '\u{2019}' => Some(0x92),
            '\u{201C}' => Some(0x93),
            '\u{201D}' => Some(0x94),
            '\u{2022}' => Some(0x95),
            '\u{2013}' => Some(0x96),
            '\u{2014}' => Some(0x97),
            '\u{02DC}' => Some(0x98),
            '\u{2122}' => Some(0x99),
            '\u{0161}' => Some(0x9A),
            '\u{203A}' => Some(0x9B),
            '\u{0153}' => Some(0x9C),
            '\u{017E}' => Some(0x9E),
            '\u{0178}' => Some(0x9F),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_widths() {
        assert_eq!(Font::Helvetica.char_width(' '), 278);
        assert_eq!(Font::Helvetica.char_width('W'), 944);
        assert_eq!(Font::Helvetica.char_width('i'), 222);
        assert_eq!(Font::Helvetica.char_width('~'), 584);
        assert_eq!(Font::HelveticaBold.char_width('i'), 278);
        assert_eq!(Font::HelveticaBold.char_width('m'), 889);
    }

    #[test]
    fn test_text_width() {
        // "SECURE" in Helvetica-Bold: 667+667+722+722+722+667
        let width = Font::HelveticaBold.text_width("SECURE", 10.0);
        assert!((width - 41.67).abs() < 0.01);
        assert_eq!(Font::Helvetica.text_width("", 12.0), 0.0);
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Page 1"), b"Page 1".to_vec());
        assert_eq!(encode_win_ansi("caf\u{e9}"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_win_ansi("\u{2014}\u{20AC}"), vec![0x97, 0x80]);
        assert_eq!(encode_win_ansi("\u{4e2d}\t"), vec![b'?', b' ']);
    }

    #[test]
    fn test_unencodable_measured_as_question_mark() {
        assert_eq!(
            Font::Helvetica.char_width('\u{4e2d}'),
            Font::Helvetica.char_width('?')
        );
    }

    #[test]
    fn test_baseline_inside_line() {
        let offset = baseline_offset(11.0, 16.0);
        assert!(offset > 11.0 * 0.5 && offset < 16.0);
    }
}
