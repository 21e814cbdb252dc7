//! Splitting input text into lines and detecting its line-ending style.

/// Split `text` on newlines, returning the lines (with any trailing `\r`
/// stripped) and whether the text uses CRLF endings.
///
/// CRLF is reported whenever any `\r` appears anywhere in the original
/// text, matching how a single `Answer` can only carry one line-ending
/// style; a trailing `\r` is stripped from every split line regardless,
/// so mixed endings never leak a stray `\r` into a working line.
pub fn split_lines(text: &str) -> (Vec<String>, bool) {
    let crlf = text.contains('\r');

    let lines = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect();

    (lines, crlf)
}

/// Rejoin processed lines using `\n` or `\r\n` per `crlf`.
pub fn join_lines(lines: &[String], crlf: bool) -> String {
    let sep = if crlf { "\r\n" } else { "\n" };
    lines.join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lf_is_not_crlf() {
        let (lines, crlf) = split_lines("(a)\n(b)");
        assert!(!crlf);
        assert_eq!(lines, vec!["(a)", "(b)"]);
    }

    #[test]
    fn crlf_is_detected_and_stripped() {
        let (lines, crlf) = split_lines("(a)\r\n(b)");
        assert!(crlf);
        assert_eq!(lines, vec!["(a)", "(b)"]);
    }

    #[test]
    fn single_line_has_no_newline_at_all() {
        let (lines, crlf) = split_lines("(a)");
        assert!(!crlf);
        assert_eq!(lines, vec!["(a)"]);
    }

    #[test]
    fn join_round_trips_with_detected_style() {
        let (lines, crlf) = split_lines("(a)\r\n(b)");
        assert_eq!(join_lines(&lines, crlf), "(a)\r\n(b)");
    }

    #[test]
    fn a_lone_cr_anywhere_in_the_text_marks_it_crlf() {
        // The first break is plain `\n`, but a later line ends in `\r\n`;
        // the whole text is still reported as CRLF per any-`\r` detection.
        let (lines, crlf) = split_lines("(a)\n(b)\r\n(c)");
        assert!(crlf);
        assert_eq!(lines, vec!["(a)", "(b)", "(c)"]);
    }
}
