//! Visual length of a label, used purely as a sort key.

/// Approximate on-screen width of `text`.
///
/// Leading and trailing whitespace is ignored. Every ASCII scalar value counts 1,
/// every other scalar value counts 2 (CJK, full-width, accented letters, emoji alike).
pub fn visual_width(text: &str) -> usize {
    text.trim()
        .chars()
        .map(|c| if c.is_ascii() { 1 } else { 2 })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", 0)]
    #[case("   \t\n", 0)]
    #[case("x", 1)]
    #[case(" x ", 1)]
    #[case("GitHub", 6)]
    #[case("中", 2)]
    #[case("中文书签", 8)]
    #[case("Rust 中文", 9)]
    #[case("café", 5)]
    #[case("全角ＡＢ", 8)]
    fn given_text_when_measuring_then_returns_expected_width(
        #[case] text: &str,
        #[case] expected: usize,
    ) {
        assert_eq!(visual_width(text), expected);
    }

    #[test]
    fn given_astral_character_when_measuring_then_counts_once() {
        // one scalar outside the BMP, two UTF-16 units, four UTF-8 bytes
        assert_eq!(visual_width("😀"), 2);
        assert_eq!(visual_width("a😀b"), 4);
    }

    #[test]
    fn given_inner_whitespace_when_measuring_then_inner_spaces_count() {
        assert_eq!(visual_width("  a b  "), 3);
    }

    #[test]
    fn given_ascii_string_when_measuring_then_width_equals_length() {
        let s = "The quick brown fox jumps over the lazy dog";
        assert_eq!(visual_width(s), s.len());
    }
}
