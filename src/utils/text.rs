// src/utils/text.rs

//! Text normalization helpers.

use unicode_segmentation::UnicodeSegmentation;

/// Collapse internal whitespace runs to single spaces and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical form for identity-bearing text: lowercased, whitespace collapsed.
///
/// Trivial re-renders of the source page (indentation, line wrapping, casing
/// of headings) must not change the canonical form.
pub fn canonicalize(s: &str) -> String {
    collapse_whitespace(&s.to_lowercase())
}

/// Truncate to at most `max` grapheme clusters, appending an ellipsis
/// when anything was cut.
pub fn truncate_graphemes(s: &str, max: usize) -> String {
    if s.graphemes(true).count() <= max {
        return s.to_string();
    }
    let mut out: String = s.graphemes(true).take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Acme \n\t Ltd  "), "Acme Ltd");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_canonicalize() {
        assert_eq!(canonicalize("  ACME   Ltd "), "acme ltd");
        assert_eq!(canonicalize("Acme Ltd"), canonicalize("acme\n ltd"));
    }

    #[test]
    fn test_truncate_short_string_untouched() {
        assert_eq!(truncate_graphemes("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_appends_ellipsis() {
        assert_eq!(truncate_graphemes("hello world", 6), "hello…");
    }

    #[test]
    fn test_truncate_counts_graphemes_not_bytes() {
        // Each flag emoji is one grapheme but several bytes.
        let flags = "🇬🇧🇬🇧🇬🇧";
        assert_eq!(truncate_graphemes(flags, 3), flags);
        assert_eq!(truncate_graphemes(flags, 2), "🇬🇧…");
    }
}
