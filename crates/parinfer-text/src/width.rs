//! Display-width classification.
//!
//! The table below is a fixed, closed set of range checks, not a generated
//! Unicode East-Asian-Width table. This is deliberate: behavior must stay
//! pinned to these exact ranges rather than silently drifting every time
//! the Unicode database updates. Do not widen this table casually; treat
//! it as a versioned contract.

/// Combining marks and zero-width joiners/format characters: width 0.
fn is_zero_width(c: char) -> bool {
    matches!(c,
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}'
        | '\u{0300}'..='\u{036F}'
        | '\u{0483}'..='\u{0489}'
        | '\u{0591}'..='\u{05BD}'
        | '\u{05BF}'
        | '\u{05C1}'..='\u{05C2}'
        | '\u{05C4}'..='\u{05C5}'
        | '\u{05C7}'
        | '\u{0610}'..='\u{061A}'
        | '\u{064B}'..='\u{065F}'
        | '\u{0670}'
        | '\u{06D6}'..='\u{06DC}'
        | '\u{06DF}'..='\u{06E4}'
        | '\u{06E7}'..='\u{06E8}'
        | '\u{06EA}'..='\u{06ED}'
        | '\u{0900}'..='\u{0903}'
        | '\u{093A}'..='\u{094F}'
        | '\u{0951}'..='\u{0957}'
        | '\u{0962}'..='\u{0963}'
        | '\u{0E31}'
        | '\u{0E34}'..='\u{0E3A}'
        | '\u{0E47}'..='\u{0E4E}'
        | '\u{1AB0}'..='\u{1AFF}'
        | '\u{1DC0}'..='\u{1DFF}'
        | '\u{20D0}'..='\u{20FF}'
        | '\u{FE20}'..='\u{FE2F}'
    )
}

/// CJK / fullwidth ranges: width 2.
fn is_wide(c: char) -> bool {
    matches!(c,
        '\u{1100}'..='\u{115F}'
        | '\u{2329}'..='\u{232A}'
        | '\u{2E80}'..='\u{2FDF}'
        | '\u{3000}'..='\u{303E}'
        | '\u{3040}'..='\u{309F}'
        | '\u{30A0}'..='\u{30FF}'
        | '\u{3100}'..='\u{312F}'
        | '\u{31A0}'..='\u{31BF}'
        | '\u{3200}'..='\u{33FF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{AC00}'..='\u{D7AF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{FE30}'..='\u{FE4F}'
        | '\u{FF01}'..='\u{FF60}'
        | '\u{FFE0}'..='\u{FFE6}'
        | '\u{20000}'..='\u{2A6DF}'
    )
}

/// Display width of a single codepoint.
///
/// `\t` is not one of the §4.1 width-table ranges; it's pinned at 2 because
/// the engine replaces every tab in code context with two literal spaces
/// (see `parinfer_engine::process::dispatch_code_char`), and leading
/// indentation is always rebuilt as spaces from the tracked column (see
/// `process_line`). The width here has to agree with that substitution so
/// the grapheme walk advances columns correctly up to the moment of
/// replacement.
pub fn codepoint_width(c: char) -> u8 {
    if c == '\t' {
        2
    } else if is_zero_width(c) {
        0
    } else if is_wide(c) {
        2
    } else {
        1
    }
}

/// Display width of a grapheme cluster: the width of its base codepoint.
/// Every codepoint after the first in a cluster is, by construction of
/// [`crate::segment::graphemes`], zero-width, so it never changes the total.
pub fn grapheme_width(cluster: &str) -> u8 {
    match cluster.chars().next() {
        Some(c) => codepoint_width(c),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_width_one() {
        assert_eq!(codepoint_width('a'), 1);
        assert_eq!(codepoint_width('('), 1);
    }

    #[test]
    fn cjk_is_width_two() {
        assert_eq!(codepoint_width('界'), 2);
        assert_eq!(codepoint_width('한'), 2); // Hangul syllable, AC00..D7AF
    }

    #[test]
    fn combining_acute_is_width_zero() {
        assert_eq!(codepoint_width('\u{0301}'), 0);
    }

    #[test]
    fn zwj_and_bom_are_width_zero() {
        assert_eq!(codepoint_width('\u{200D}'), 0);
        assert_eq!(codepoint_width('\u{FEFF}'), 0);
    }

    #[test]
    fn cluster_width_uses_base_codepoint() {
        assert_eq!(grapheme_width("e\u{0301}"), 1);
        assert_eq!(grapheme_width("界"), 2);
        assert_eq!(grapheme_width(""), 0);
    }

    #[test]
    fn tab_is_width_two() {
        assert_eq!(codepoint_width('\t'), 2);
    }

    #[test]
    fn emoji_outside_documented_ranges_is_not_silently_widened() {
        // U+1F600 (GRINNING FACE) is not in any documented range; this
        // table intentionally does not widen it.
        assert_eq!(codepoint_width('😀'), 1);
    }
}
