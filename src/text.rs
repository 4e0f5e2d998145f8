//! Text Module — Display width measurement and wrap-unit tokenisation.
//!
//! Responsibilities:
//! - Column width of grapheme clusters and strings (CJK and emoji = 2,
//!   combining sequences = 0 extra)
//! - Splitting text into wrap units at whitespace and common punctuation
//!
//! Every width comes from [`grapheme_width`], so wrapping math and the
//! glyphs actually emitted always agree.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Characters that end a wrap unit. Each one forms a unit on its own.
const WRAP_BOUNDARIES: &[char] = &[
    ' ', '\t', '\r', '\n', ',', '.', ';', ':', '/', '?', '!', '-',
];

/// Width of a single grapheme cluster, always 0, 1, or 2.
///
/// Control clusters are 0 wide except tab, which takes one column.
pub fn grapheme_width(grapheme: &str) -> usize {
    match grapheme.chars().next() {
        None => 0,
        Some('\t') => 1,
        Some(c) if c.is_control() => 0,
        Some(_) => UnicodeWidthStr::width(grapheme).min(2),
    }
}

/// Measure the display cell width of a UTF-8 string.
pub fn measure_text(text: &str) -> usize {
    text.graphemes(true).map(grapheme_width).sum()
}

/// The glyph written to the grid for a grapheme. Tabs become a space.
pub(crate) fn display_symbol(grapheme: &str) -> &str {
    if grapheme == "\t" {
        " "
    } else {
        grapheme
    }
}

/// Whether a wrap unit is a line feed (`"\n"` or `"\r\n"`).
pub(crate) fn is_line_feed(unit: &str) -> bool {
    unit == "\n" || unit == "\r\n"
}

fn is_boundary(grapheme: &str) -> bool {
    let mut chars = grapheme.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => WRAP_BOUNDARIES.contains(&c),
        (Some('\r'), Some('\n')) => chars.next().is_none(),
        _ => false,
    }
}

/// Split `text` into wrap units: maximal runs of non-boundary graphemes, and
/// every boundary grapheme as a unit of its own.
///
/// ```
/// use markdown_grid::text::split_wrap_units;
/// assert_eq!(split_wrap_units("a, b"), vec!["a", ",", " ", "b"]);
/// ```
pub fn split_wrap_units(text: &str) -> Vec<&str> {
    let mut units = Vec::new();
    let mut run_start: Option<usize> = None;

    for (idx, g) in text.grapheme_indices(true) {
        if is_boundary(g) {
            if let Some(start) = run_start.take() {
                units.push(&text[start..idx]);
            }
            units.push(g);
        } else if run_start.is_none() {
            run_start = Some(idx);
        }
    }
    if let Some(start) = run_start {
        units.push(&text[start..]);
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_text_ascii() {
        assert_eq!(measure_text("hello"), 5);
        assert_eq!(measure_text(""), 0);
    }

    #[test]
    fn test_measure_text_cjk() {
        // CJK characters are 2 cells wide
        assert_eq!(measure_text("你好"), 4);
    }

    #[test]
    fn test_combining_sequence_is_one_column() {
        // "e" + COMBINING ACUTE ACCENT is a single cluster
        let s = "e\u{0301}";
        assert_eq!(s.graphemes(true).count(), 1);
        assert_eq!(measure_text(s), 1);
    }

    #[test]
    fn test_zwj_emoji_never_exceeds_two() {
        let family = "👨\u{200D}👩\u{200D}👧";
        assert_eq!(family.graphemes(true).count(), 1);
        assert!(grapheme_width(family) <= 2);
    }

    #[test]
    fn test_control_widths() {
        assert_eq!(grapheme_width("\n"), 0);
        assert_eq!(grapheme_width("\r"), 0);
        assert_eq!(grapheme_width("\u{7}"), 0);
        assert_eq!(grapheme_width("\t"), 1);
        assert_eq!(display_symbol("\t"), " ");
        assert_eq!(display_symbol("x"), "x");
    }

    #[test]
    fn test_split_keeps_delimiters() {
        assert_eq!(
            split_wrap_units("Hello World"),
            vec!["Hello", " ", "World"]
        );
        assert_eq!(
            split_wrap_units("see https://x.io/a-b"),
            vec!["see", " ", "https", ":", "/", "/", "x", ".", "io", "/", "a", "-", "b"]
        );
    }

    #[test]
    fn test_split_preserves_repeated_spaces() {
        assert_eq!(split_wrap_units("a   b"), vec!["a", " ", " ", " ", "b"]);
    }

    #[test]
    fn test_split_line_feeds() {
        let units = split_wrap_units("one\r\ntwo\nthree");
        assert_eq!(units, vec!["one", "\r\n", "two", "\n", "three"]);
        assert!(is_line_feed(units[1]));
        assert!(is_line_feed(units[3]));
        assert!(!is_line_feed(units[0]));
    }

    #[test]
    fn test_split_empty() {
        assert!(split_wrap_units("").is_empty());
    }

    #[test]
    fn test_split_concatenation_round_trips() {
        let text = "Zero-Width Joiner (ZWJ) sequences: 👨\u{200D}👩\u{200D}👧, ok?";
        assert_eq!(split_wrap_units(text).concat(), text);
    }
}
