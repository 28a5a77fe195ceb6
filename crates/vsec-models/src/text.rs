//! Analysis text helpers.

/// Whether `text` contains nothing but whitespace.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Split analysis text into paragraphs.
///
/// A paragraph boundary is one or more blank lines. Windows line endings are
/// accepted. Each paragraph is trimmed and empty paragraphs are dropped, so
/// the result preserves the original order of every non-empty paragraph.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");

    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in normalized.split('\n') {
        if is_blank(line) {
            flush(&mut current, &mut paragraphs);
        } else {
            current.push(line);
        }
    }
    flush(&mut current, &mut paragraphs);

    paragraphs
}

fn flush(lines: &mut Vec<&str>, out: &mut Vec<String>) {
    if lines.is_empty() {
        return;
    }
    let paragraph = lines.join("\n");
    let paragraph = paragraph.trim();
    if !paragraph.is_empty() {
        out.push(paragraph.to_string());
    }
    lines.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_paragraphs() {
        let text = "Incident observed at 00:12.\n\nSubject exits frame at 00:45.";
        assert_eq!(
            split_paragraphs(text),
            vec!["Incident observed at 00:12.", "Subject exits frame at 00:45."]
        );
    }

    #[test]
    fn test_empty_paragraphs_dropped() {
        let text = "\n\nfirst\n\n\n\n   \n\nsecond\n\n";
        assert_eq!(split_paragraphs(text), vec!["first", "second"]);
    }

    #[test]
    fn test_single_newline_stays_in_paragraph() {
        let text = "line one\nline two\n\nnext";
        assert_eq!(split_paragraphs(text), vec!["line one\nline two", "next"]);
    }

    #[test]
    fn test_crlf_and_whitespace_lines() {
        let text = "alpha\r\n  \r\nbeta\r\n\t\r\ngamma";
        assert_eq!(split_paragraphs(text), vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_blank_text() {
        assert!(split_paragraphs("").is_empty());
        assert!(split_paragraphs(" \n\n \t ").is_empty());
        assert!(is_blank("\n\t "));
        assert!(!is_blank(" x "));
    }

    #[test]
    fn test_order_preserved() {
        let text: Vec<String> = (0..50).map(|i| format!("Paragraph {i}")).collect();
        let joined = text.join("\n\n");
        assert_eq!(split_paragraphs(&joined), text);
    }
}
