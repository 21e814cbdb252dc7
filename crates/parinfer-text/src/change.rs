//! Change inference between a previous and current text.

use crate::width::codepoint_width;
use parinfer_model::Change;

/// Return the single `Change` describing the differing span between `prev`
/// and `curr`, or `None` if they're identical. Forward-scans codepoints
/// until they diverge, then reverse-scans from the ends until indices
/// cross the forward divergence point; exactly one `Change` is ever
/// produced, regardless of how many characters actually differ.
pub fn compute_text_change(prev: &str, curr: &str) -> Option<Change> {
    if prev == curr {
        return None;
    }

    let prev_chars: Vec<char> = prev.chars().collect();
    let curr_chars: Vec<char> = curr.chars().collect();

    let mut start = 0usize;
    while start < prev_chars.len()
        && start < curr_chars.len()
        && prev_chars[start] == curr_chars[start]
    {
        start += 1;
    }

    let mut prev_end = prev_chars.len();
    let mut curr_end = curr_chars.len();
    while prev_end > start && curr_end > start && prev_chars[prev_end - 1] == curr_chars[curr_end - 1] {
        prev_end -= 1;
        curr_end -= 1;
    }

    let old_text: String = prev_chars[start..prev_end].iter().collect();
    let new_text: String = curr_chars[start..curr_end].iter().collect();
    let (line_no, x) = position_of(&prev_chars, start);

    Some(Change::new(x, line_no, old_text, new_text))
}

/// The (line, display-column) of codepoint index `idx` within `chars`.
fn position_of(chars: &[char], idx: usize) -> (usize, usize) {
    let mut line_no = 0usize;
    let mut x = 0usize;
    for &c in &chars[..idx] {
        if c == '\n' {
            line_no += 1;
            x = 0;
        } else {
            x += codepoint_width(c) as usize;
        }
    }
    (line_no, x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_yields_no_change() {
        assert!(compute_text_change("(foo)", "(foo)").is_none());
    }

    #[test]
    fn single_char_insertion() {
        let change = compute_text_change("abc", "abXc").unwrap();
        assert_eq!(change.old_text, "");
        assert_eq!(change.new_text, "X");
        assert_eq!(change.x, 2);
        assert_eq!(change.line_no, 0);
    }

    #[test]
    fn single_char_deletion() {
        let change = compute_text_change("abXc", "abc").unwrap();
        assert_eq!(change.old_text, "X");
        assert_eq!(change.new_text, "");
        assert_eq!(change.x, 2);
    }

    #[test]
    fn whole_text_appended_to_empty() {
        let change = compute_text_change("", "hello").unwrap();
        assert_eq!(change.old_text, "");
        assert_eq!(change.new_text, "hello");
        assert_eq!(change.x, 0);
        assert_eq!(change.line_no, 0);
    }

    #[test]
    fn edit_on_second_line_reports_correct_line_and_column() {
        let prev = "(a)\n(b)";
        let curr = "(a)\n(bX)";
        let change = compute_text_change(prev, curr).unwrap();
        assert_eq!(change.line_no, 1);
        assert_eq!(change.x, 2);
        assert_eq!(change.new_text, "X");
    }

    #[test]
    fn multi_character_edit_is_a_single_change() {
        let change = compute_text_change("(foo bar)", "(food bars)").unwrap();
        assert_eq!(change.old_text, " bar");
        assert_eq!(change.new_text, "d bars");
    }
}
